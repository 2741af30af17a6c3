//! Fleet-wide auto-sync: one daily sync per opted-in user, plus the steady
//! cadence loop that drives it.

use std::time::{Duration as StdDuration, Instant};

use chrono::{Duration, Utc};
use diesel::prelude::*;
use log::{error, info, warn};

use crate::calendar::CalendarClient;
use crate::client::AladhanClient;
use crate::db::models::{NewSyncLog, Preference, User};
use crate::models::sync::{LocationConfig, School, SyncType};
use crate::pacing::Pacer;
use crate::schema::{preferences, sync_logs, users};
use crate::services::daily;

#[derive(Debug, Clone, Copy, Default)]
pub struct PassSummary {
    pub total: usize,
    pub synced: usize,
    pub skipped: usize,
}

/// Sync tomorrow's prayers for every user with auto-sync enabled, pausing
/// between users. One user's failure (including authorization loss) never
/// stops the pass; every attempted sync leaves a log row.
pub fn run_pass(conn: &mut PgConnection, aladhan: &AladhanClient, pacer: &Pacer) -> Result<PassSummary, String> {
    let rows: Vec<(User, Preference)> = users::table
        .inner_join(preferences::table)
        .filter(preferences::auto_sync_enabled.eq(true))
        .select((User::as_select(), Preference::as_select()))
        .load(conn)
        .map_err(|e| format!("Loading auto-sync users failed: {}", e))?;

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let mut summary = PassSummary {
        total: rows.len(),
        ..PassSummary::default()
    };
    info!("Auto-sync pass for {} user(s), target date {}", rows.len(), tomorrow);

    for (i, (user, prefs)) in rows.iter().enumerate() {
        if i > 0 {
            pacer.between_users();
        }

        let Some(token) = user.access_token.as_deref().filter(|t| !t.trim().is_empty()) else {
            warn!("Skipping user {}: no stored access token", user.email);
            summary.skipped += 1;
            continue;
        };
        let location = match location_from_preferences(prefs) {
            Ok(location) => location,
            Err(e) => {
                warn!("Skipping user {}: {}", user.email, e);
                summary.skipped += 1;
                continue;
            }
        };

        let calendar = CalendarClient::new(token);
        let log = match daily::sync_day(aladhan, &calendar, &location, tomorrow, pacer) {
            Ok(result) => {
                summary.synced += 1;
                NewSyncLog::from_result(Some(user.id), SyncType::Daily, tomorrow, tomorrow, &result)
            }
            Err(abort) => {
                error!("Sync aborted for user {}: {}", user.email, abort);
                summary.skipped += 1;
                NewSyncLog::aborted(Some(user.id), SyncType::Daily, tomorrow, tomorrow, &abort.to_string())
            }
        };
        record_sync(conn, &log)?;
    }

    info!(
        "Auto-sync pass done: {} synced, {} skipped of {}",
        summary.synced, summary.skipped, summary.total
    );
    Ok(summary)
}

/// Run auto-sync passes forever on a steady cadence. A pass that overruns
/// the interval starts the next one immediately.
pub fn run_loop(
    conn: &mut PgConnection,
    aladhan: &AladhanClient,
    pacer: &Pacer,
    interval: StdDuration,
) -> Result<(), String> {
    loop {
        let started = Instant::now();
        run_pass(conn, aladhan, pacer)?;
        let elapsed = started.elapsed();
        if let Some(remaining) = interval.checked_sub(elapsed) {
            std::thread::sleep(remaining);
        } else {
            warn!(
                "Auto-sync pass took {}s, longer than the {}s interval",
                elapsed.as_secs(),
                interval.as_secs()
            );
        }
    }
}

pub fn record_sync(conn: &mut PgConnection, log: &NewSyncLog) -> Result<(), String> {
    diesel::insert_into(sync_logs::table)
        .values(log)
        .execute(conn)
        .map_err(|e| format!("Recording sync log failed: {}", e))?;
    Ok(())
}

/// Build a per-user location from stored preferences. Users without both
/// coordinates are skipped; stored rows are otherwise validated the same
/// way env-driven locations are.
fn location_from_preferences(prefs: &Preference) -> Result<LocationConfig, String> {
    let (Some(latitude), Some(longitude)) = (prefs.latitude, prefs.longitude) else {
        return Err("missing coordinates".to_string());
    };
    let school = School::from_code(prefs.school).ok_or_else(|| format!("bad school code {}", prefs.school))?;

    let location = LocationConfig::new(&prefs.city, &prefs.country, latitude, longitude, &prefs.timezone)
        .map_err(|e| e.to_string())?
        .with_elevation(prefs.elevation)
        .with_method(prefs.calculation_method)
        .with_school(school)
        .with_adjustments(prefs.adjustments.clone())
        .with_reminder_minutes(prefs.reminder_minutes.max(0) as u32);
    Ok(location)
}
