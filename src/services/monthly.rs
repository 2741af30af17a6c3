//! Monthly sync: one calendar month from a single monthly fetch.

use log::{info, warn};

use crate::calendar::CalendarClient;
use crate::client::AladhanClient;
use crate::models::sync::{LocationConfig, SyncAbort, SyncResult};
use crate::pacing::Pacer;
use crate::services::daily::upsert_day;

/// Sync every day of `(year, month)`. The whole month comes back from one
/// fetch; a failed fetch yields one counted failure.
pub fn sync_month(
    aladhan: &AladhanClient,
    calendar: &CalendarClient,
    location: &LocationConfig,
    year: i32,
    month: u32,
    pacer: &Pacer,
) -> Result<SyncResult, SyncAbort> {
    info!("Monthly sync for {}-{:02} ({})", year, month, location.city);
    let mut result = SyncResult::default();

    let days = match aladhan.get_monthly_calendar(location, year, month) {
        Ok(days) => days,
        Err(e) => {
            warn!("Schedule fetch failed for {}-{:02}: {}", year, month, e);
            result.events_failed += 1;
            result
                .errors
                .push(format!("Failed to fetch prayer times for {}-{:02}: {}", year, month, e));
            return Ok(result);
        }
    };

    for (i, day) in days.iter().enumerate() {
        upsert_day(calendar, location, day, pacer, &mut result)?;
        if i + 1 < days.len() {
            pacer.after_upsert();
        }
    }

    info!(
        "Monthly sync for {}-{:02} done: {} created, {} updated, {} failed",
        year, month, result.events_created, result.events_updated, result.events_failed
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::day_payload;
    use crate::models::sync::SyncStatus;
    use crate::pacing::PacingPolicy;
    use serde_json::json;

    fn location() -> LocationConfig {
        LocationConfig::new("Jakarta", "Indonesia", -6.2088, 106.8456, "Asia/Jakarta").unwrap()
    }

    #[test]
    fn syncs_every_returned_day() {
        let mut aladhan_server = mockito::Server::new();
        let body = json!({
            "code": 200,
            "status": "OK",
            "data": [
                day_payload("01-03-2024", "20-08-1445"),
                day_payload("02-03-2024", "21-08-1445"),
                day_payload("03-03-2024", "22-08-1445"),
            ],
        });
        aladhan_server
            .mock("GET", "/calendar/2024/3")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create();
        let mut calendar_server = mockito::Server::new();
        let inserts = calendar_server
            .mock("POST", "/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "x"}"#)
            .expect(15)
            .create();

        let aladhan = AladhanClient::with_base_url(aladhan_server.url());
        let calendar = CalendarClient::with_base_url("token", calendar_server.url());
        let result = sync_month(
            &aladhan,
            &calendar,
            &location(),
            2024,
            3,
            &Pacer::new(PacingPolicy::zero()),
        )
        .unwrap();

        inserts.assert();
        assert_eq!(result.events_created, 15);
        assert_eq!(result.status(), SyncStatus::Success);
    }

    #[test]
    fn fetch_failure_is_one_counted_failure() {
        let mut aladhan_server = mockito::Server::new();
        aladhan_server
            .mock("GET", "/calendar/2024/3")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create();
        let calendar_server = mockito::Server::new();

        let aladhan = AladhanClient::with_base_url(aladhan_server.url());
        let calendar = CalendarClient::with_base_url("token", calendar_server.url());
        let result = sync_month(
            &aladhan,
            &calendar,
            &location(),
            2024,
            3,
            &Pacer::new(PacingPolicy::zero()),
        )
        .unwrap();

        assert_eq!(result.events_created, 0);
        assert_eq!(result.events_failed, 1);
        assert!(result.errors[0].starts_with("Failed to fetch prayer times for 2024-03"));
        assert_eq!(result.status(), SyncStatus::Failed);
    }
}
