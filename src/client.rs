//! Standalone HTTP client for the AlAdhan prayer-times API (v1 GET endpoints).
//!
//! - Blocking client using `ureq` (no async).
//! - Deserializes into the typed payloads in `crate::models::aladhan` and
//!   converts them to validated `DaySchedule`s; nothing partially populated
//!   leaves this module.
//! - Locations are always passed as coordinates (plus method/school/tune),
//!   for every request shape.

use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::models::aladhan::{DayData, Envelope};
use crate::models::sync::{DaySchedule, LocationConfig, Prayer};
use crate::pacing::Pacer;
use log::debug;

const BASE_URL: &str = "https://api.aladhan.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum AladhanError {
    Transport(String),
    Http { status: u16, message: String },
    /// The response body did not validate against the expected shape.
    Payload(String),
}

impl core::fmt::Display for AladhanError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AladhanError::Transport(s) => write!(f, "transport error: {}", s),
            AladhanError::Http { status, message } => write!(f, "http {}: {}", status, message),
            AladhanError::Payload(s) => write!(f, "invalid payload: {}", s),
        }
    }
}

impl std::error::Error for AladhanError {}

pub struct AladhanClient {
    agent: ureq::Agent,
    base_url: String,
}

impl AladhanClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at a different host. Tests use this.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        AladhanClient {
            agent,
            base_url: base_url.into(),
        }
    }

    /// Prayer times for a single civil date.
    pub fn get_daily_timings(&self, location: &LocationConfig, date: NaiveDate) -> Result<DaySchedule, AladhanError> {
        let path = format!("/timings/{}", date.format("%d-%m-%Y"));
        let envelope: Envelope<DayData> = self.get_json(&path, &location_query(location))?;
        check_envelope(&envelope)?;
        to_schedule(&envelope.data)
    }

    /// Prayer times for every day of one calendar month.
    pub fn get_monthly_calendar(
        &self,
        location: &LocationConfig,
        year: i32,
        month: u32,
    ) -> Result<Vec<DaySchedule>, AladhanError> {
        let path = format!("/calendar/{}/{}", year, month);
        let envelope: Envelope<Vec<DayData>> = self.get_json(&path, &location_query(location))?;
        check_envelope(&envelope)?;
        envelope.data.iter().map(to_schedule).collect()
    }

    /// Prayer times for a whole year: twelve monthly requests in month order,
    /// paced apart. This is not a single upstream call.
    pub fn get_yearly_calendar(
        &self,
        location: &LocationConfig,
        year: i32,
        pacer: &Pacer,
    ) -> Result<Vec<DaySchedule>, AladhanError> {
        let mut all_days = Vec::new();
        for month in 1..=12 {
            debug!("Fetching month {}/{}", month, year);
            all_days.extend(self.get_monthly_calendar(location, year, month)?);
            if month < 12 {
                pacer.between_month_fetches();
            }
        }
        Ok(all_days)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&'static str, String)]) -> Result<T, AladhanError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.agent.get(&url).set("Accept", "application/json");
        for (k, v) in query {
            req = req.query(k, v);
        }

        match req.call() {
            Ok(res) => {
                let mut de = serde_json::Deserializer::from_reader(res.into_reader());
                serde_path_to_error::deserialize(&mut de).map_err(|e| AladhanError::Payload(e.to_string()))
            }
            Err(ureq::Error::Transport(t)) => Err(AladhanError::Transport(t.to_string())),
            Err(ureq::Error::Status(status, res)) => {
                let message = res.into_string().unwrap_or_else(|_| String::from("<no body>"));
                Err(AladhanError::Http { status, message })
            }
        }
    }
}

impl Default for AladhanClient {
    fn default() -> Self {
        Self::new()
    }
}

fn location_query(location: &LocationConfig) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
        ("method", location.method.to_string()),
        ("school", location.school.code().to_string()),
    ];
    if let Some(elevation) = location.elevation {
        query.push(("elevation", elevation.to_string()));
    }
    if let Some(tune) = &location.adjustments {
        query.push(("tune", tune.clone()));
    }
    query
}

fn check_envelope<T>(envelope: &Envelope<T>) -> Result<(), AladhanError> {
    if envelope.code == 200 {
        Ok(())
    } else {
        Err(AladhanError::Http {
            status: envelope.code as u16,
            message: envelope.status.clone().unwrap_or_else(|| "<no status>".to_string()),
        })
    }
}

/// Validate one raw day into a `DaySchedule`.
///
/// The five canonical fields already exist (required by deserialization);
/// here each must additionally start with an `HH:MM` token, and the civil
/// date must parse. Anything else is a fetch failure for the whole day.
fn to_schedule(day: &DayData) -> Result<DaySchedule, AladhanError> {
    let date = NaiveDate::parse_from_str(&day.date.gregorian.date, "%d-%m-%Y")
        .map_err(|_| AladhanError::Payload(format!("bad gregorian date: {:?}", day.date.gregorian.date)))?;

    let timings = [
        (Prayer::Fajr, &day.timings.fajr),
        (Prayer::Dhuhr, &day.timings.dhuhr),
        (Prayer::Asr, &day.timings.asr),
        (Prayer::Maghrib, &day.timings.maghrib),
        (Prayer::Isha, &day.timings.isha),
    ];
    for (prayer, value) in &timings {
        if !looks_time_like(value) {
            return Err(AladhanError::Payload(format!(
                "timing {} is not time-like: {:?}",
                prayer, value
            )));
        }
    }

    let hijri = &day.date.hijri;
    Ok(DaySchedule {
        date,
        hijri: format!("{} {} {}", hijri.date, hijri.month.en, hijri.year),
        fajr: day.timings.fajr.clone(),
        dhuhr: day.timings.dhuhr.clone(),
        asr: day.timings.asr.clone(),
        maghrib: day.timings.maghrib.clone(),
        isha: day.timings.isha.clone(),
    })
}

fn looks_time_like(value: &str) -> bool {
    value
        .split_whitespace()
        .next()
        .is_some_and(|token| NaiveTime::parse_from_str(token, "%H:%M").is_ok())
}


#[cfg(test)]
mod tests {
    use super::test_support::day_payload;
    use super::*;
    use crate::pacing::test_support::recording_pacer;
    use crate::pacing::PacingPolicy;
    use serde_json::json;

    fn location() -> LocationConfig {
        LocationConfig::new("Jakarta", "Indonesia", -6.2088, 106.8456, "Asia/Jakarta").unwrap()
    }

    #[test]
    fn parses_day_fixture() {
        let raw = std::fs::read_to_string("tests/data/aladhan-day.json").expect("fixture present");
        let envelope: Envelope<DayData> = serde_json::from_str(&raw).expect("parse day payload");
        let schedule = to_schedule(&envelope.data).unwrap();
        assert_eq!(schedule.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(schedule.fajr, "04:42 (WIB)");
        assert!(schedule.hijri.contains("1445"));
    }

    #[test]
    fn daily_fetch_returns_validated_schedule() {
        let mut server = mockito::Server::new();
        let body = json!({ "code": 200, "status": "OK", "data": day_payload("15-03-2024", "05-09-1445") });
        let mock = server
            .mock("GET", "/timings/15-03-2024")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create();

        let client = AladhanClient::with_base_url(server.url());
        let schedule = client
            .get_daily_timings(&location(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .unwrap();

        mock.assert();
        assert_eq!(schedule.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(schedule.time_of(Prayer::Isha), "19:17 (WIB)");
    }

    #[test]
    fn missing_prayer_field_is_a_fetch_failure() {
        let mut server = mockito::Server::new();
        let mut day = day_payload("15-03-2024", "05-09-1445");
        day["timings"].as_object_mut().unwrap().remove("Fajr");
        let body = json!({ "code": 200, "status": "OK", "data": day });
        server
            .mock("GET", "/timings/15-03-2024")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create();

        let client = AladhanClient::with_base_url(server.url());
        let err = client
            .get_daily_timings(&location(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .unwrap_err();
        assert!(matches!(err, AladhanError::Payload(_)), "{}", err);
    }

    #[test]
    fn non_time_like_value_is_a_fetch_failure() {
        let mut server = mockito::Server::new();
        let mut day = day_payload("15-03-2024", "05-09-1445");
        day["timings"]["Maghrib"] = json!("sunset");
        let body = json!({ "code": 200, "status": "OK", "data": day });
        server
            .mock("GET", "/timings/15-03-2024")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create();

        let client = AladhanClient::with_base_url(server.url());
        let err = client
            .get_daily_timings(&location(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .unwrap_err();
        assert!(matches!(err, AladhanError::Payload(_)));
    }

    #[test]
    fn upstream_error_status_is_surfaced() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/timings/15-03-2024")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create();

        let client = AladhanClient::with_base_url(server.url());
        let err = client
            .get_daily_timings(&location(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .unwrap_err();
        assert!(matches!(err, AladhanError::Http { status: 503, .. }));
    }

    #[test]
    fn envelope_error_code_is_surfaced() {
        let mut server = mockito::Server::new();
        let body = json!({ "code": 500, "status": "Internal Server Error", "data": day_payload("15-03-2024", "05-09-1445") });
        server
            .mock("GET", "/timings/15-03-2024")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create();

        let client = AladhanClient::with_base_url(server.url());
        let err = client
            .get_daily_timings(&location(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .unwrap_err();
        assert!(matches!(err, AladhanError::Http { status: 500, .. }));
    }

    #[test]
    fn monthly_fetch_returns_every_day() {
        let mut server = mockito::Server::new();
        let body = json!({
            "code": 200,
            "status": "OK",
            "data": [
                day_payload("01-03-2024", "20-08-1445"),
                day_payload("02-03-2024", "21-08-1445"),
            ],
        });
        server
            .mock("GET", "/calendar/2024/3")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create();

        let client = AladhanClient::with_base_url(server.url());
        let days = client.get_monthly_calendar(&location(), 2024, 3).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn yearly_fetch_issues_twelve_paced_monthly_requests() {
        let mut server = mockito::Server::new();
        for month in 1..=12 {
            let body = json!({
                "code": 200,
                "status": "OK",
                "data": [day_payload(&format!("01-{:02}-2024", month), "01-01-1446")],
            });
            server
                .mock("GET", format!("/calendar/2024/{}", month).as_str())
                .match_query(mockito::Matcher::Any)
                .with_status(200)
                .with_body(body.to_string())
                .create();
        }

        let (pacer, log) = recording_pacer(PacingPolicy::default());
        let client = AladhanClient::with_base_url(server.url());
        let days = client.get_yearly_calendar(&location(), 2024, &pacer).unwrap();

        assert_eq!(days.len(), 12);
        let months: Vec<u32> = days.iter().map(|d| chrono::Datelike::month(&d.date)).collect();
        assert_eq!(months, (1..=12).collect::<Vec<_>>());

        // eleven pauses between twelve requests
        let pauses = log.lock().unwrap().clone();
        assert_eq!(pauses.len(), 11);
        assert!(pauses.iter().all(|d| *d == Duration::from_millis(500)));
    }
}
