//! Typed payloads for the AlAdhan prayer-times API (v1).
//!
//! Scope: response shapes only, no client code.
//!
//! Notes
//! - The five canonical prayer fields are required; a payload missing any of
//!   them fails deserialization outright rather than producing a partial
//!   schedule.
//! - Time-of-day fields remain strings (`"HH:MM"`, sometimes annotated, e.g.
//!   `"04:42 (WIB)"`); conversion to instants happens downstream.

use serde::{Deserialize, Serialize};

/// Standard response wrapper: `{ "code": 200, "status": "OK", "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub status: Option<String>,
    pub data: T,
}

/// One day of the provider's calendar: timings plus dual-calendar metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayData {
    pub timings: Timings,
    pub date: DateInfo,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timings {
    #[serde(rename = "Fajr")]
    pub fajr: String,
    #[serde(rename = "Sunrise", default)]
    pub sunrise: Option<String>,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    #[serde(rename = "Sunset", default)]
    pub sunset: Option<String>,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    #[serde(rename = "Isha")]
    pub isha: String,
    #[serde(rename = "Imsak", default)]
    pub imsak: Option<String>,
    #[serde(rename = "Midnight", default)]
    pub midnight: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateInfo {
    #[serde(default)]
    pub readable: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub gregorian: GregorianDate,
    pub hijri: HijriDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GregorianDate {
    /// `DD-MM-YYYY`
    pub date: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HijriDate {
    /// `DD-MM-YYYY` in the Hijri calendar
    pub date: String,
    #[serde(default)]
    pub day: Option<String>,
    pub month: HijriMonth,
    pub year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HijriMonth {
    #[serde(default)]
    pub number: Option<i64>,
    pub en: String,
    #[serde(default)]
    pub ar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub method: Option<MethodInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}
