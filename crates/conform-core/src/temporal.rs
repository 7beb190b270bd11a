//! # Temporal Helpers — Date Parsing and Rendering
//!
//! Dates in conform are always `DateTime<Utc>`. This module holds the
//! conversions used by date coercion and by JSON rendering:
//!
//! - `YYYY-MM-DD` date-only strings denote midnight UTC of that day.
//! - Full RFC 3339 strings are accepted with any offset and normalized to UTC.
//! - Numbers are interpreted as Unix epoch **milliseconds**.
//!
//! Rendering uses ISO 8601 with millisecond precision and a `Z` suffix,
//! e.g. `1980-01-01T00:00:00.000Z`.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};

use crate::error::ConformError;

/// Parse a date-only or RFC 3339 string into a UTC instant.
///
/// # Errors
///
/// Returns [`ConformError::InvalidDate`] if the string is neither a
/// `YYYY-MM-DD` calendar date nor a valid RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, ConformError> {
    let s = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return midnight_utc(day);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ConformError::InvalidDate(format!("{s:?}: {e}")))
}

/// Build the UTC instant for a Unix epoch timestamp in milliseconds.
///
/// Fractional milliseconds are truncated.
pub fn from_epoch_millis(millis: f64) -> Result<DateTime<Utc>, ConformError> {
    if !millis.is_finite() {
        return Err(ConformError::InvalidDate(format!(
            "epoch milliseconds must be finite, got {millis}"
        )));
    }
    Utc.timestamp_millis_opt(millis.trunc() as i64)
        .single()
        .ok_or_else(|| ConformError::InvalidDate(format!("epoch milliseconds out of range: {millis}")))
}

/// Midnight UTC at the start of a calendar day.
pub fn midnight_utc(day: NaiveDate) -> Result<DateTime<Utc>, ConformError> {
    day.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ConformError::InvalidDate(format!("no midnight for {day}")))
}

/// Unix epoch milliseconds of a UTC instant.
pub fn to_epoch_millis(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64
}

/// Render as ISO 8601 with millisecond precision and `Z` suffix.
pub fn to_iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
