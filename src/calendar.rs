//! Gateway to the Google Calendar v3 API, scoped to one authenticated
//! principal and one target calendar.
//!
//! - Blocking client using `ureq`, bearer-token auth.
//! - Events carry a deterministic identity key derived from (prayer, civil
//!   date), so re-running a sync updates instead of duplicating: insert
//!   first, and only on a 409 conflict update the existing event.
//! - 401/403 map to `CalendarError::Unauthorized`, which callers treat as
//!   batch-fatal; everything else is a per-event failure.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::models::sync::{Prayer, PrayerEvent};

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const PRIMARY_CALENDAR: &str = "primary";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
/// Title/description convention used to recognize our own events.
const EVENT_MARKER: &str = "Prayer";

#[derive(Debug)]
pub enum CalendarError {
    /// The store rejected our credentials; no further call can succeed.
    Unauthorized(String),
    Transport(String),
    Http { status: u16, message: String },
}

impl core::fmt::Display for CalendarError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CalendarError::Unauthorized(s) => write!(f, "unauthorized: {}", s),
            CalendarError::Transport(s) => write!(f, "transport error: {}", s),
            CalendarError::Http { status, message } => write!(f, "http {}: {}", status, message),
        }
    }
}

impl std::error::Error for CalendarError {}

/// Which path an upsert took. Both carry the remote event id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Created(String),
    Updated(String),
}

/// An event as returned by the store's list operation.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventTime {
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(rename = "timeZone", default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct EventResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<RemoteEvent>,
}

pub struct CalendarClient {
    agent: ureq::Agent,
    base_url: String,
    access_token: String,
    calendar_id: String,
}

impl CalendarClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, BASE_URL)
    }

    /// Point the client at a different host. Tests use this.
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        CalendarClient {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            base_url: base_url.into(),
            access_token: access_token.into(),
            calendar_id: PRIMARY_CALENDAR.to_string(),
        }
    }

    /// Target a specific calendar instead of the principal's primary one.
    pub fn with_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    /// Insert the event under its deterministic id; on a 409 conflict (and
    /// only then) update the existing event instead.
    pub fn upsert_event(&self, event: &PrayerEvent) -> Result<Upsert, CalendarError> {
        let id = event_id(event.prayer, event.date);
        let mut body = event_body(event);
        body["id"] = json!(id);

        let url = format!("{}/calendars/{}/events", self.base_url, self.calendar_id);
        match self.send_json(self.agent.post(&url), &body) {
            Ok(resource) => Ok(Upsert::Created(resource.id)),
            Err(CalendarError::Http { status: 409, .. }) => {
                let url = format!("{}/calendars/{}/events/{}", self.base_url, self.calendar_id, id);
                let resource = self.send_json(self.agent.put(&url), &event_body(event))?;
                Ok(Upsert::Updated(resource.id))
            }
            Err(e) => Err(e),
        }
    }

    /// Expanded events overlapping the range that carry our marker, ordered
    /// by start time. Not used by the sync path itself.
    pub fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RemoteEvent>, CalendarError> {
        let url = format!("{}/calendars/{}/events", self.base_url, self.calendar_id);
        let req = self
            .agent
            .get(&url)
            .query("timeMin", &start.to_rfc3339_opts(SecondsFormat::Secs, true))
            .query("timeMax", &end.to_rfc3339_opts(SecondsFormat::Secs, true))
            .query("singleEvents", "true")
            .query("orderBy", "startTime")
            .query("q", EVENT_MARKER);

        let res = self.execute(req, None)?;
        let list: EventList = res.into_json().map_err(|e| CalendarError::Transport(e.to_string()))?;
        Ok(list.items)
    }

    /// Remove one event by its remote id.
    pub fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let url = format!("{}/calendars/{}/events/{}", self.base_url, self.calendar_id, event_id);
        self.execute(self.agent.delete(&url), None)?;
        Ok(())
    }

    fn send_json(&self, req: ureq::Request, body: &serde_json::Value) -> Result<EventResource, CalendarError> {
        let res = self.execute(req, Some(body))?;
        res.into_json().map_err(|e| CalendarError::Transport(e.to_string()))
    }

    fn execute(&self, req: ureq::Request, body: Option<&serde_json::Value>) -> Result<ureq::Response, CalendarError> {
        let req = req
            .set("Accept", "application/json")
            .set("Authorization", &format!("Bearer {}", self.access_token));

        let result = match body {
            Some(b) => req.send_json(b),
            None => req.call(),
        };

        match result {
            Ok(res) => Ok(res),
            Err(ureq::Error::Transport(t)) => Err(CalendarError::Transport(t.to_string())),
            Err(ureq::Error::Status(status, res)) => {
                let message = res.into_string().unwrap_or_else(|_| String::from("<no body>"));
                if status == 401 || status == 403 {
                    Err(CalendarError::Unauthorized(format!("http {}: {}", status, message)))
                } else {
                    Err(CalendarError::Http { status, message })
                }
            }
        }
    }
}

/// Deterministic identity key for one (prayer, civil date) occurrence.
///
/// The store requires base32hex ids (`a`-`v` and `0`-`9` only), so `w`-`z`
/// are remapped and anything else dropped. No user component: the key lives
/// inside a user-scoped calendar namespace.
pub fn event_id(prayer: Prayer, date: NaiveDate) -> String {
    let raw = format!("salah{}{}", prayer.name().to_ascii_lowercase(), date.format("%Y%m%d"));
    raw.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .map(|c| match c {
            'w' => 'a',
            'x' => 'b',
            'y' => 'c',
            'z' => 'd',
            other => other,
        })
        .collect()
}

fn event_body(event: &PrayerEvent) -> serde_json::Value {
    json!({
        "summary": format!("{} {}", event.prayer, EVENT_MARKER),
        "description": event.description,
        "start": {
            "dateTime": event.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            "timeZone": event.timezone.name(),
        },
        "end": {
            "dateTime": event.end().to_rfc3339_opts(SecondsFormat::Secs, true),
            "timeZone": event.timezone.name(),
        },
        "reminders": {
            "useDefault": false,
            "overrides": [
                { "method": "popup", "minutes": event.reminder_minutes },
                { "method": "email", "minutes": event.reminder_minutes },
            ],
        },
        "colorId": event.prayer.color_id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Jakarta;

    fn fajr_event() -> PrayerEvent {
        PrayerEvent {
            prayer: Prayer::Fajr,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            start: Utc.with_ymd_and_hms(2024, 3, 14, 21, 42, 0).unwrap(),
            timezone: Jakarta,
            reminder_minutes: 10,
            description: "Fajr prayer time - 05-09-1445 Ramaḍān 1445 Hijri".to_string(),
            city: "Jakarta".to_string(),
        }
    }

    #[test]
    fn identity_key_is_stable_and_known() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(event_id(Prayer::Fajr, date), "salahfajr20240315");
        assert_eq!(event_id(Prayer::Fajr, date), event_id(Prayer::Fajr, date));
        assert_eq!(event_id(Prayer::Isha, date), "salahisha20240315");
    }

    #[test]
    fn identity_key_uses_base32hex_alphabet() {
        for prayer in Prayer::ALL {
            for date in [
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(1999, 7, 4).unwrap(),
            ] {
                let id = event_id(prayer, date);
                assert!(
                    id.chars().all(|c| ('a'..='v').contains(&c) || c.is_ascii_digit()),
                    "bad id {:?}",
                    id
                );
            }
        }
    }

    #[test]
    fn event_body_carries_reminders_color_and_zone() {
        let body = event_body(&fajr_event());
        assert_eq!(body["summary"], "Fajr Prayer");
        assert_eq!(body["colorId"], "7");
        assert_eq!(body["start"]["dateTime"], "2024-03-14T21:42:00Z");
        assert_eq!(body["start"]["timeZone"], "Asia/Jakarta");
        assert_eq!(body["end"]["dateTime"], "2024-03-14T21:57:00Z");
        assert_eq!(body["reminders"]["useDefault"], false);
        let overrides = body["reminders"]["overrides"].as_array().unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[0]["method"], "popup");
        assert_eq!(overrides[1]["method"], "email");
        assert!(overrides.iter().all(|o| o["minutes"] == 10));
    }

    #[test]
    fn upsert_creates_when_id_is_free() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "salahfajr20240315"}"#)
            .create();

        let client = CalendarClient::with_base_url("token", server.url());
        let outcome = client.upsert_event(&fajr_event()).unwrap();

        mock.assert();
        assert_eq!(outcome, Upsert::Created("salahfajr20240315".to_string()));
    }

    #[test]
    fn upsert_falls_back_to_update_on_conflict() {
        let mut server = mockito::Server::new();
        let create = server
            .mock("POST", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(409)
            .with_body(r#"{"error": {"code": 409, "message": "The requested identifier already exists."}}"#)
            .create();
        let update = server
            .mock("PUT", "/calendars/primary/events/salahfajr20240315")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "salahfajr20240315"}"#)
            .create();

        let client = CalendarClient::with_base_url("token", server.url());
        let outcome = client.upsert_event(&fajr_event()).unwrap();

        create.assert();
        update.assert();
        assert_eq!(outcome, Upsert::Updated("salahfajr20240315".to_string()));
    }

    #[test]
    fn expired_token_maps_to_unauthorized() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#)
            .create();

        let client = CalendarClient::with_base_url("expired", server.url());
        let err = client.upsert_event(&fajr_event()).unwrap_err();
        assert!(matches!(err, CalendarError::Unauthorized(_)), "{}", err);
    }

    #[test]
    fn other_store_errors_are_not_conflated_with_conflict() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": {"code": 400, "message": "Invalid resource id value."}}"#)
            .create();

        let client = CalendarClient::with_base_url("token", server.url());
        let err = client.upsert_event(&fajr_event()).unwrap_err();
        assert!(matches!(err, CalendarError::Http { status: 400, .. }));
    }

    #[test]
    fn list_parses_remote_events() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{
                    "items": [
                        {
                            "id": "salahfajr20240315",
                            "summary": "Fajr Prayer",
                            "start": { "dateTime": "2024-03-14T21:42:00Z", "timeZone": "Asia/Jakarta" },
                            "end": { "dateTime": "2024-03-14T21:57:00Z", "timeZone": "Asia/Jakarta" }
                        },
                        {
                            "id": "salahdhuhr20240315",
                            "summary": "Dhuhr Prayer",
                            "start": { "dateTime": "2024-03-15T05:04:00Z" },
                            "end": { "dateTime": "2024-03-15T05:19:00Z" }
                        }
                    ]
                }"#,
            )
            .create();

        let client = CalendarClient::with_base_url("token", server.url());
        let start = Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap();
        let events = client.list_events(start, end).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "salahfajr20240315");
        assert_eq!(events[1].summary.as_deref(), Some("Dhuhr Prayer"));
        assert!(events[0].start.as_ref().unwrap().date_time.is_some());
    }

    #[test]
    fn delete_removes_by_id() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/calendars/primary/events/salahfajr20240315")
            .match_query(mockito::Matcher::Any)
            .with_status(204)
            .create();

        let client = CalendarClient::with_base_url("token", server.url());
        client.delete_event("salahfajr20240315").unwrap();
        mock.assert();
    }

    #[test]
    fn non_primary_calendar_is_addressed() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/calendars/family/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "salahfajr20240315"}"#)
            .create();

        let client = CalendarClient::with_base_url("token", server.url()).with_calendar("family");
        client.upsert_event(&fajr_event()).unwrap();
        mock.assert();
    }
}
