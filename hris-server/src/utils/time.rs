//! Time helpers in the company time zone
//!
//! Dates travel as `YYYY-MM-DD` strings, instants as Unix millis. All
//! local-time conversions go through this module.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse an `HH:MM` time of day
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Parse `HH:MM`, falling back to `default` with a warning
pub fn parse_hhmm_or(value: &str, default: NaiveTime, key: &str) -> NaiveTime {
    parse_hhmm(value).unwrap_or_else(|| {
        tracing::warn!(
            "Failed to parse {} '{}', falling back to {}",
            key,
            value,
            default.format("%H:%M")
        );
        default
    })
}

/// Date + local time of day → Unix millis (company time zone)
///
/// Ambiguous local times (DST fold) resolve to the later instant; a local
/// time that does not exist (DST gap) falls back to UTC.
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Date start (00:00) → Unix millis
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_time_to_millis(date, NaiveTime::MIN, tz)
}

/// Next day 00:00 → Unix millis; callers use `< end`
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_time_to_millis(next_day, NaiveTime::MIN, tz)
}

/// Unix millis → local date-time; out-of-range millis clamp to the epoch
pub fn millis_to_local(millis: i64, tz: Tz) -> DateTime<Tz> {
    tz.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&DateTime::<Utc>::UNIX_EPOCH.naive_utc()))
}

/// Local calendar date of an instant
pub fn local_date(millis: i64, tz: Tz) -> NaiveDate {
    millis_to_local(millis, tz).date_naive()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse an IANA time zone name
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}
