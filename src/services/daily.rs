//! Daily sync: one civil date, five prayers.

use chrono::NaiveDate;
use log::{info, warn};

use crate::calendar::{CalendarClient, CalendarError, Upsert};
use crate::client::AladhanClient;
use crate::models::sync::{DaySchedule, LocationConfig, Prayer, PrayerEvent, SyncAbort, SyncResult};
use crate::pacing::Pacer;

/// Sync the five prayers of `date`. A failed schedule fetch yields one
/// counted failure and an otherwise empty result; only authorization loss
/// aborts.
pub fn sync_day(
    aladhan: &AladhanClient,
    calendar: &CalendarClient,
    location: &LocationConfig,
    date: NaiveDate,
    pacer: &Pacer,
) -> Result<SyncResult, SyncAbort> {
    info!("Daily sync for {} ({})", date, location.city);
    let mut result = SyncResult::default();

    let schedule = match aladhan.get_daily_timings(location, date) {
        Ok(schedule) => schedule,
        Err(e) => {
            warn!("Schedule fetch failed for {}: {}", date, e);
            result.events_failed += 1;
            result
                .errors
                .push(format!("Failed to fetch prayer times for {}: {}", date, e));
            return Ok(result);
        }
    };

    upsert_day(calendar, location, &schedule, pacer, &mut result)?;
    info!(
        "Daily sync for {} done: {} created, {} updated, {} failed",
        date, result.events_created, result.events_updated, result.events_failed
    );
    Ok(result)
}

/// Upsert the five prayers of one schedule, folding outcomes into `result`.
/// Mapping and upsert failures are counted per prayer; only authorization
/// loss escapes.
pub(crate) fn upsert_day(
    calendar: &CalendarClient,
    location: &LocationConfig,
    schedule: &DaySchedule,
    pacer: &Pacer,
    result: &mut SyncResult,
) -> Result<(), SyncAbort> {
    for (i, prayer) in Prayer::ALL.into_iter().enumerate() {
        match PrayerEvent::from_schedule(schedule, prayer, location) {
            Ok(event) => match calendar.upsert_event(&event) {
                Ok(Upsert::Created(_)) => result.events_created += 1,
                Ok(Upsert::Updated(_)) => result.events_updated += 1,
                Err(CalendarError::Unauthorized(msg)) => return Err(SyncAbort::Unauthorized(msg)),
                Err(e) => record_failure(result, prayer, schedule.date, &e),
            },
            Err(e) => record_failure(result, prayer, schedule.date, &e),
        }
        if i + 1 < Prayer::ALL.len() {
            pacer.after_upsert();
        }
    }
    Ok(())
}

fn record_failure(result: &mut SyncResult, prayer: Prayer, date: NaiveDate, error: &dyn core::fmt::Display) {
    warn!("Failed to create {} for {}: {}", prayer, date, error);
    result.events_failed += 1;
    result
        .errors
        .push(format!("Failed to create {} for {}: {}", prayer, date, error));
}
