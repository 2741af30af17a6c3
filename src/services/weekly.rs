//! Weekly sync: the Sunday-to-Saturday week containing a reference date.

use chrono::{Duration, NaiveDate};
use log::info;

use crate::calendar::CalendarClient;
use crate::client::AladhanClient;
use crate::models::sync::{LocationConfig, SyncAbort, SyncResult};
use crate::pacing::Pacer;
use crate::services::daily;
use crate::utils::week_start;

/// Sync all seven days of the week containing `reference`, one daily fetch
/// per day. A failed day is counted and the loop continues.
pub fn sync_week(
    aladhan: &AladhanClient,
    calendar: &CalendarClient,
    location: &LocationConfig,
    reference: NaiveDate,
    pacer: &Pacer,
) -> Result<SyncResult, SyncAbort> {
    let start = week_start(reference);
    info!(
        "Weekly sync for {} to {} ({})",
        start,
        start + Duration::days(6),
        location.city
    );

    let mut total = SyncResult::default();
    for offset in 0..7 {
        let date = start + Duration::days(offset);
        total.absorb(daily::sync_day(aladhan, calendar, location, date, pacer)?);
        if offset < 6 {
            pacer.between_days();
        }
    }

    info!(
        "Weekly sync done: {} created, {} updated, {} failed, status {}",
        total.events_created,
        total.events_updated,
        total.events_failed,
        total.status().as_str()
    );
    Ok(total)
}
