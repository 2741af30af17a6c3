//! Core sync domain types: prayers, locations, schedules, events, batch results.
//!
//! Everything here is plain data. Construction validates invariants
//! (coordinate ranges, IANA zone names); nothing is mutated afterwards.

use crate::utils::{resolve_local_time, TimeResolveError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use core::fmt;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed calendar-event duration for every prayer occurrence.
pub const EVENT_DURATION_MINUTES: i64 = 15;

/// The five daily prayers, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [Prayer::Fajr, Prayer::Dhuhr, Prayer::Asr, Prayer::Maghrib, Prayer::Isha];

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    /// Google Calendar color id (valid range 1-11), one fixed value per prayer.
    pub fn color_id(self) -> &'static str {
        match self {
            Prayer::Fajr => "7",     // cyan
            Prayer::Dhuhr => "5",    // yellow
            Prayer::Asr => "6",      // orange
            Prayer::Maghrib => "11", // red
            Prayer::Isha => "1",     // lavender
        }
    }
}

impl Display for Prayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Juristic school used for the Asr calculation, as the provider's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum School {
    Shafi,
    Hanafi,
}

impl School {
    pub fn code(self) -> u8 {
        match self {
            School::Shafi => 0,
            School::Hanafi => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<School> {
        match code {
            0 => Some(School::Shafi),
            1 => Some(School::Hanafi),
            _ => None,
        }
    }
}

/// Errors raised while constructing a [`LocationConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    InvalidTimezone(String),
}

impl Display for LocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::LatitudeOutOfRange(v) => write!(f, "latitude {} outside [-90, 90]", v),
            LocationError::LongitudeOutOfRange(v) => write!(f, "longitude {} outside [-180, 180]", v),
            LocationError::InvalidTimezone(s) => write!(f, "not an IANA timezone: {:?}", s),
        }
    }
}

impl Error for LocationError {}

/// Where and how prayer times are computed for one principal.
///
/// Supplied fresh per sync call; immutable once constructed.
#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level, when known.
    pub elevation: Option<f64>,
    pub timezone: Tz,
    /// Provider calculation-method code, passed through unchanged.
    pub method: i32,
    pub school: School,
    /// Optional per-prayer minute offsets, provider `tune` format
    /// (comma-separated, e.g. `"0,0,0,0,0,0,0,0,0"`).
    pub adjustments: Option<String>,
    /// Reminder lead time applied to every event.
    pub reminder_minutes: u32,
}

impl LocationConfig {
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timezone: &str,
    ) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::LongitudeOutOfRange(longitude));
        }
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| LocationError::InvalidTimezone(timezone.to_string()))?;

        Ok(LocationConfig {
            city: city.into(),
            country: country.into(),
            latitude,
            longitude,
            elevation: None,
            timezone,
            method: 20,
            school: School::Shafi,
            adjustments: None,
            reminder_minutes: 10,
        })
    }

    pub fn with_elevation(mut self, elevation: Option<f64>) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_method(mut self, method: i32) -> Self {
        self.method = method;
        self
    }

    pub fn with_school(mut self, school: School) -> Self {
        self.school = school;
        self
    }

    pub fn with_adjustments(mut self, adjustments: Option<String>) -> Self {
        self.adjustments = adjustments;
        self
    }

    pub fn with_reminder_minutes(mut self, minutes: u32) -> Self {
        self.reminder_minutes = minutes;
        self
    }
}

/// One civil date's validated prayer times, as returned by the timetable
/// provider. Times remain the provider's `HH:MM` local strings; the Hijri
/// label is carried for event descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub hijri: String,
    pub fajr: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl DaySchedule {
    pub fn time_of(&self, prayer: Prayer) -> &str {
        match prayer {
            Prayer::Fajr => &self.fajr,
            Prayer::Dhuhr => &self.dhuhr,
            Prayer::Asr => &self.asr,
            Prayer::Maghrib => &self.maghrib,
            Prayer::Isha => &self.isha,
        }
    }
}

/// One concrete prayer occurrence ready to be written to the calendar.
#[derive(Debug, Clone)]
pub struct PrayerEvent {
    pub prayer: Prayer,
    /// Civil date of the occurrence; together with `prayer` this determines
    /// the event's identity.
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub timezone: Tz,
    pub reminder_minutes: u32,
    pub description: String,
    pub city: String,
}

impl PrayerEvent {
    /// Map one (schedule, prayer) pair into an event descriptor.
    pub fn from_schedule(
        schedule: &DaySchedule,
        prayer: Prayer,
        location: &LocationConfig,
    ) -> Result<Self, TimeResolveError> {
        let start = resolve_local_time(schedule.time_of(prayer), schedule.date, location.timezone)?;
        Ok(PrayerEvent {
            prayer,
            date: schedule.date,
            start,
            timezone: location.timezone,
            reminder_minutes: location.reminder_minutes,
            description: format!("{} prayer time - {} Hijri", prayer, schedule.hijri),
            city: location.city.clone(),
        })
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(EVENT_DURATION_MINUTES)
    }
}

/// Terminal status of one sync batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl SyncStatus {
    /// FAILED only when nothing was created and something failed;
    /// SUCCESS when nothing failed; PARTIAL_SUCCESS otherwise.
    pub fn from_counts(created: u32, failed: u32) -> SyncStatus {
        if failed == 0 {
            SyncStatus::Success
        } else if created > 0 {
            SyncStatus::PartialSuccess
        } else {
            SyncStatus::Failed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Success => "SUCCESS",
            SyncStatus::PartialSuccess => "PARTIAL_SUCCESS",
            SyncStatus::Failed => "FAILED",
        }
    }
}

/// Which orchestrator produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl SyncType {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncType::Daily => "DAILY",
            SyncType::Weekly => "WEEKLY",
            SyncType::Monthly => "MONTHLY",
            SyncType::Yearly => "YEARLY",
        }
    }
}

/// Accumulated outcome of one sync batch. Unit failures are folded in here;
/// a batch never discards the successes it already counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub events_created: u32,
    pub events_updated: u32,
    pub events_failed: u32,
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Fold another batch's counts and errors into this one.
    pub fn absorb(&mut self, other: SyncResult) {
        self.events_created += other.events_created;
        self.events_updated += other.events_updated;
        self.events_failed += other.events_failed;
        self.errors.extend(other.errors);
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus::from_counts(self.events_created, self.events_failed)
    }

    /// Error messages joined for persistence, `None` when the batch was clean.
    pub fn joined_errors(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }
}

/// Conditions that abort a whole batch instead of being counted per unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAbort {
    /// The calendar store rejected our credentials; no further unit can succeed.
    Unauthorized(String),
}

impl Display for SyncAbort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SyncAbort::Unauthorized(msg) => write!(f, "calendar authorization failed: {}", msg),
        }
    }
}

impl Error for SyncAbort {}
