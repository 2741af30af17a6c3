use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use core::fmt;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors that can occur while resolving a wall-clock prayer time to an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeResolveError {
    /// The input did not start with a parseable `HH:MM` token
    BadFormat(String),
    /// The wall-clock time does not exist on that date in that zone (DST gap)
    NonexistentLocalTime(String),
}

impl Display for TimeResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TimeResolveError::BadFormat(s) => write!(f, "invalid time string: {:?}", s),
            TimeResolveError::NonexistentLocalTime(s) => {
                write!(f, "local time does not exist in timezone: {}", s)
            }
        }
    }
}

impl Error for TimeResolveError {}

/// Resolve a provider time string to an absolute instant.
///
/// The provider returns local wall-clock times as `HH:MM`, sometimes with a
/// trailing annotation (e.g. `"04:42 (WIB)"`); only the leading token is
/// significant. The hour/minute are interpreted on `date` in `tz` and
/// converted to UTC. Ambiguous local times (DST fold) resolve to the earlier
/// instant.
pub fn resolve_local_time(time_str: &str, date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, TimeResolveError> {
    let token = time_str
        .split_whitespace()
        .next()
        .ok_or_else(|| TimeResolveError::BadFormat(time_str.to_string()))?;
    let time = NaiveTime::parse_from_str(token, "%H:%M")
        .map_err(|_| TimeResolveError::BadFormat(time_str.to_string()))?;

    let local = date.and_time(time);
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(TimeResolveError::NonexistentLocalTime(format!(
            "{} {} {}",
            date, token, tz
        ))),
    }
}

/// The Sunday that starts the civil week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("valid month")
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).expect("valid month")
    };
    (first, next - Duration::days(1))
}
