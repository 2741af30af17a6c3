pub mod models {
    pub mod aladhan;
    pub mod sync;
}

pub mod calendar;
pub mod cities;
pub mod client;
pub mod config;
pub mod db {
    pub mod models;
}
pub mod pacing;
pub mod schema;
pub mod utils;
pub mod services {
    pub mod daily;
    pub mod monthly;
    pub mod scheduler;
    pub mod weekly;
    pub mod yearly;
}

use chrono::{Datelike, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::calendar::CalendarClient;
use crate::client::AladhanClient;
use crate::config::{Config, SyncSelector};
use crate::db::models::NewSyncLog;
use crate::models::sync::{LocationConfig, SyncType};
use crate::pacing::{Pacer, PacingPolicy};
use crate::services::{daily, monthly, scheduler, weekly, yearly};
use crate::utils::{month_bounds, week_start};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn apply_database_migrations(conn: &mut PgConnection) -> Result<(), String> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) => {
            if applied.is_empty() {
                info!("Database schema is up to date; no migrations were applied");
            } else {
                let names = applied.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                info!("Applied {} database migration(s): {}", applied.len(), names);
            }
            Ok(())
        }
        Err(e) => Err(format!("Applying database migrations failed: {}", e)),
    }
}

/// Resolve the sync location: explicit env coordinates first, then the
/// preset matching CITY, then Jakarta.
fn resolve_location(cfg: &Config) -> Result<LocationConfig, String> {
    let (latitude, longitude, elevation, timezone) = match (cfg.latitude, cfg.longitude) {
        (Some(latitude), Some(longitude)) => {
            let timezone = cfg
                .timezone
                .clone()
                .ok_or_else(|| "TIMEZONE is required when LATITUDE/LONGITUDE are set".to_string())?;
            (latitude, longitude, cfg.elevation, timezone)
        }
        _ => {
            let city = match cities::find(&cfg.city) {
                Some(city) => city,
                None => {
                    let fallback = cities::default_city();
                    warn!("No preset coordinates for {:?}; defaulting to {}", cfg.city, fallback.name);
                    fallback
                }
            };
            let timezone = cfg.timezone.clone().unwrap_or_else(|| city.timezone.to_string());
            (city.latitude, city.longitude, Some(city.elevation), timezone)
        }
    };

    let location = LocationConfig::new(&cfg.city, &cfg.country, latitude, longitude, &timezone)
        .map_err(|e| format!("Invalid location: {}", e))?
        .with_elevation(elevation)
        .with_method(cfg.calculation_method)
        .with_school(cfg.school)
        .with_adjustments(cfg.adjustments.clone())
        .with_reminder_minutes(cfg.reminder_minutes);
    Ok(location)
}

fn run_on_demand(
    conn: &mut PgConnection,
    cfg: &Config,
    selector: SyncSelector,
    aladhan: &AladhanClient,
    pacer: &Pacer,
) -> Result<(), String> {
    let token = cfg
        .google_access_token
        .as_deref()
        .ok_or_else(|| "GOOGLE_ACCESS_TOKEN is required for an on-demand sync".to_string())?;
    let calendar = CalendarClient::new(token);
    let location = resolve_location(cfg)?;

    let today: NaiveDate = Utc::now().with_timezone(&location.timezone).date_naive();

    let (sync_type, start_date, end_date, outcome) = match selector {
        SyncSelector::Today => {
            let r = daily::sync_day(aladhan, &calendar, &location, today, pacer);
            (SyncType::Daily, today, today, r)
        }
        SyncSelector::Tomorrow => {
            let date = today + Duration::days(1);
            let r = daily::sync_day(aladhan, &calendar, &location, date, pacer);
            (SyncType::Daily, date, date, r)
        }
        SyncSelector::Week => {
            let start = week_start(today);
            let r = weekly::sync_week(aladhan, &calendar, &location, today, pacer);
            (SyncType::Weekly, start, start + Duration::days(6), r)
        }
        SyncSelector::Month => {
            let (start, end) = month_bounds(today.year(), today.month());
            let r = monthly::sync_month(aladhan, &calendar, &location, today.year(), today.month(), pacer);
            (SyncType::Monthly, start, end, r)
        }
        SyncSelector::Year => {
            let (start, _) = month_bounds(today.year(), 1);
            let (_, end) = month_bounds(today.year(), 12);
            let r = yearly::sync_year(aladhan, &calendar, &location, today.year(), pacer);
            (SyncType::Yearly, start, end, r)
        }
    };

    match outcome {
        Ok(result) => {
            let log = NewSyncLog::from_result(None, sync_type, start_date, end_date, &result);
            scheduler::record_sync(conn, &log)?;
            info!(
                "{} sync finished with status {}: {} created, {} updated, {} failed",
                sync_type.as_str(),
                result.status().as_str(),
                result.events_created,
                result.events_updated,
                result.events_failed
            );
            if let Some(errors) = result.joined_errors() {
                warn!("Sync errors: {}", errors);
            }
            Ok(())
        }
        Err(abort) => {
            let log = NewSyncLog::aborted(None, sync_type, start_date, end_date, &abort.to_string());
            scheduler::record_sync(conn, &log)?;
            Err(format!("{} sync aborted: {}", sync_type.as_str(), abort))
        }
    }
}

pub fn run() -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (sync_type={}, city={}, method={}, auto_sync_enabled={}, auto_sync_interval={}s)",
        cfg.sync_type.map(|s| format!("{:?}", s)).unwrap_or_else(|| "-".to_string()),
        cfg.city,
        cfg.calculation_method,
        cfg.auto_sync_enabled,
        cfg.auto_sync_interval.as_secs()
    );

    // 2) Connect DB and apply pending migrations
    let mut conn = PgConnection::establish(&cfg.database_url).map_err(|e| format!("DB connection failed: {}", e))?;
    info!("Connected to database");
    apply_database_migrations(&mut conn)?;

    // 3) Shared collaborators
    let aladhan = AladhanClient::new();
    let pacer = Pacer::new(PacingPolicy::default());

    // 4) On-demand batch, when requested
    if let Some(selector) = cfg.sync_type {
        run_on_demand(&mut conn, &cfg, selector, &aladhan, &pacer)?;
    }

    // 5) Fleet-wide auto-sync loop
    if cfg.auto_sync_enabled {
        info!("Starting auto-sync loop, interval={}s", cfg.auto_sync_interval.as_secs());
        scheduler::run_loop(&mut conn, &aladhan, &pacer, cfg.auto_sync_interval)?;
    } else if cfg.sync_type.is_none() {
        info!("Nothing to do: set SYNC_TYPE for a one-shot sync or AUTO_SYNC_ENABLED=1 for the loop");
    }

    Ok(())
}

fn configure_env_from_cli() -> Result<Option<PathBuf>, String> {
    let mut args = std::env::args_os();
    args.next(); // skip program name

    let mut env_file: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--env-file") => {
                let value = args
                    .next()
                    .ok_or_else(|| "`--env-file` requires a path argument".to_string())?;
                env_file = Some(PathBuf::from(value));
            }
            Some(s) if s.starts_with("--env-file=") => {
                env_file = Some(PathBuf::from(&s["--env-file=".len()..]));
            }
            Some(other) => return Err(format!("unrecognised argument: {}", other)),
            None => return Err("argument contains invalid UTF-8".to_string()),
        }
    }

    let path = match env_file {
        Some(path) => {
            if !path.is_file() {
                return Err(format!("env file not found: {}", path.display()));
            }
            path
        }
        None => {
            let default = PathBuf::from(".env");
            if !default.is_file() {
                return Ok(None);
            }
            default
        }
    };
    load_env_file(&path)?;
    Ok(Some(path))
}

fn load_env_file(path: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);
        let Some((key, value)) = assignment.split_once('=') else {
            return Err(format!("{}: missing '=' in {:?}", path.display(), trimmed));
        };
        let key = key.trim();
        if key.is_empty() || key.chars().any(|c| c.is_whitespace()) {
            return Err(format!("{}: bad variable name in {:?}", path.display(), trimmed));
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        // Values already supplied via the process environment win.
        if std::env::var_os(key).is_none() {
            // Updating process-level environment variables is unsafe on some targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    Ok(())
}

fn main() {
    let loaded_env = match configure_env_from_cli() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(path) = loaded_env.as_ref() {
        info!("Environment loaded from {}", path.display());
    }

    info!(
        "salah-sync {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
