//! Yearly sync: twelve monthly syncs in month order.

use log::info;

use crate::calendar::CalendarClient;
use crate::client::AladhanClient;
use crate::models::sync::{LocationConfig, SyncAbort, SyncResult};
use crate::pacing::Pacer;
use crate::services::monthly;

/// Sync all twelve months of `year`. The result is the field-wise sum of
/// the twelve monthly runs; a failed month is counted and the loop
/// continues.
pub fn sync_year(
    aladhan: &AladhanClient,
    calendar: &CalendarClient,
    location: &LocationConfig,
    year: i32,
    pacer: &Pacer,
) -> Result<SyncResult, SyncAbort> {
    info!("Yearly sync for {} ({})", year, location.city);

    let mut total = SyncResult::default();
    for month in 1..=12 {
        info!("Syncing month {}/{}", month, year);
        total.absorb(monthly::sync_month(aladhan, calendar, location, year, month, pacer)?);
        if month < 12 {
            pacer.between_months();
        }
    }

    info!(
        "Yearly sync for {} done: {} created, {} updated, {} failed, status {}",
        year,
        total.events_created,
        total.events_updated,
        total.events_failed,
        total.status().as_str()
    );
    Ok(total)
}
