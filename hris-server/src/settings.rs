//! Per-company settings
//!
//! System settings drive attendance ([`AttendancePolicy`]); payroll settings
//! drive [`PayrollRates`](crate::payroll::PayrollRates). Both are stored as
//! `key → value` text and validated here before every write.

use std::collections::HashMap;

use chrono::NaiveTime;
use chrono_tz::Tz;
use shared::error::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use crate::attendance::{GeoPoint, Geofence};
use crate::db::repository::setting::{self, SettingScope};
use crate::db::with_busy_retry;
use crate::payroll::rates;
use crate::utils::time;

pub const KEY_OFFICE_LATITUDE: &str = "office_latitude";
pub const KEY_OFFICE_LONGITUDE: &str = "office_longitude";
pub const KEY_OFFICE_RADIUS_M: &str = "office_radius_m";
pub const KEY_OFFICE_START_TIME: &str = "office_start_time";
pub const KEY_OFFICE_END_TIME: &str = "office_end_time";
pub const KEY_LATE_GRACE_MINUTES: &str = "late_grace_minutes";
pub const KEY_TIMEZONE: &str = "timezone";

pub const SYSTEM_SETTING_KEYS: &[&str] = &[
    KEY_OFFICE_LATITUDE,
    KEY_OFFICE_LONGITUDE,
    KEY_OFFICE_RADIUS_M,
    KEY_OFFICE_START_TIME,
    KEY_OFFICE_END_TIME,
    KEY_LATE_GRACE_MINUTES,
    KEY_TIMEZONE,
];

/// Grace periods longer than a day make no sense
const MAX_GRACE_MINUTES: u32 = 24 * 60;

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Typed view of the attendance-related system settings
#[derive(Debug, Clone, PartialEq)]
pub struct AttendancePolicy {
    /// `None` when the office location or radius is not configured
    pub geofence: Option<Geofence>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub grace_minutes: u32,
    pub timezone: Tz,
}

impl AttendancePolicy {
    pub fn from_settings(settings: &HashMap<String, String>, default_tz: Tz) -> Self {
        let number = |key: &str| -> Option<f64> {
            let raw = settings.get(key)?;
            match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    tracing::warn!(key, value = %raw, "Ignoring non-numeric setting");
                    None
                }
            }
        };

        let geofence = match (
            number(KEY_OFFICE_LATITUDE),
            number(KEY_OFFICE_LONGITUDE),
            number(KEY_OFFICE_RADIUS_M),
        ) {
            (Some(lat), Some(lng), Some(radius)) => GeoPoint::new(lat, lng)
                .ok()
                .and_then(|center| Geofence::new(center, radius)),
            _ => None,
        };

        let start_time = settings
            .get(KEY_OFFICE_START_TIME)
            .map(|v| time::parse_hhmm_or(v, default_start_time(), KEY_OFFICE_START_TIME))
            .unwrap_or_else(default_start_time);
        let end_time = settings
            .get(KEY_OFFICE_END_TIME)
            .map(|v| time::parse_hhmm_or(v, default_end_time(), KEY_OFFICE_END_TIME))
            .unwrap_or_else(default_end_time);

        let grace_minutes = settings
            .get(KEY_LATE_GRACE_MINUTES)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|v| v.min(MAX_GRACE_MINUTES))
            .unwrap_or(0);

        let timezone = settings
            .get(KEY_TIMEZONE)
            .and_then(|v| time::parse_timezone(v))
            .unwrap_or(default_tz);

        Self {
            geofence,
            start_time,
            end_time,
            grace_minutes,
            timezone,
        }
    }
}

/// Load the attendance policy of a company
pub async fn load_policy(
    pool: &SqlitePool,
    company_id: i64,
    default_tz: Tz,
) -> AppResult<AttendancePolicy> {
    let map = setting::load_map(pool, SettingScope::System, company_id).await?;
    Ok(AttendancePolicy::from_settings(&map, default_tz))
}

/// Load the payroll rate table of a company
pub async fn load_payroll_rates(pool: &SqlitePool, company_id: i64) -> AppResult<rates::PayrollRates> {
    let map = setting::load_map(pool, SettingScope::Payroll, company_id).await?;
    Ok(rates::PayrollRates::from_settings(&map))
}

/// Check one system setting
pub fn validate_system_setting(key: &str, value: &str) -> AppResult<()> {
    let invalid = |msg: String| {
        Err(AppError::with_message(ErrorCode::InvalidSettingValue, msg).with_detail("key", key))
    };
    let trimmed = value.trim();

    match key {
        KEY_OFFICE_LATITUDE | KEY_OFFICE_LONGITUDE => {
            let range = if key == KEY_OFFICE_LATITUDE { 90.0 } else { 180.0 };
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() && v.abs() <= range => Ok(()),
                _ => invalid(format!("{key} must be a number between -{range} and {range}")),
            }
        }
        KEY_OFFICE_RADIUS_M => match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(()),
            _ => invalid(format!("{key} must be a non-negative number of meters")),
        },
        KEY_OFFICE_START_TIME | KEY_OFFICE_END_TIME => match time::parse_hhmm(trimmed) {
            Some(_) => Ok(()),
            None => invalid(format!("{key} must be HH:MM")),
        },
        KEY_LATE_GRACE_MINUTES => match trimmed.parse::<u32>() {
            Ok(v) if v <= MAX_GRACE_MINUTES => Ok(()),
            _ => invalid(format!("{key} must be 0..={MAX_GRACE_MINUTES} minutes")),
        },
        KEY_TIMEZONE => match time::parse_timezone(trimmed) {
            Some(_) => Ok(()),
            None => invalid(format!("Unknown time zone: {trimmed}")),
        },
        _ => Err(unknown_setting(key)),
    }
}

fn unknown_setting(key: &str) -> AppError {
    AppError::with_message(ErrorCode::UnknownSetting, format!("Unknown setting: {key}"))
        .with_detail("key", key)
}

/// Check one payroll setting
pub fn validate_payroll_setting(key: &str, value: &str) -> AppResult<()> {
    if !rates::PAYROLL_SETTING_KEYS.contains(&key) {
        return Err(unknown_setting(key));
    }
    rates::validate_setting(key, value).map_err(|msg| {
        AppError::with_message(ErrorCode::InvalidSettingValue, format!("{key}: {msg}"))
            .with_detail("key", key)
    })
}

/// Stored settings of a scope
pub async fn get(
    pool: &SqlitePool,
    scope: SettingScope,
    company_id: i64,
) -> AppResult<HashMap<String, String>> {
    Ok(setting::load_map(pool, scope, company_id).await?)
}

/// Validate every pair, then upsert them all in one transaction.
///
/// Nothing is written when any pair is rejected. Returns the full stored map.
pub async fn update(
    pool: &SqlitePool,
    scope: SettingScope,
    company_id: i64,
    values: HashMap<String, String>,
) -> AppResult<HashMap<String, String>> {
    if values.is_empty() {
        return Err(AppError::validation("No settings to update"));
    }

    let values: HashMap<String, String> = values
        .into_iter()
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    for (key, value) in &values {
        match scope {
            SettingScope::System => validate_system_setting(key, value)?,
            SettingScope::Payroll => validate_payroll_setting(key, value)?,
        }
    }

    with_busy_retry("settings.update", || {
        setting::upsert_many(pool, scope, company_id, &values)
    })
    .await?;

    tracing::info!(company_id, ?scope, count = values.len(), "Settings updated");
    get(pool, scope, company_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use chrono_tz::Asia::{Jakarta, Makassar};

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_policy_defaults() {
        let policy = AttendancePolicy::from_settings(&HashMap::new(), Jakarta);
        assert!(policy.geofence.is_none());
        assert_eq!(policy.start_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(policy.end_time, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(policy.grace_minutes, 0);
        assert_eq!(policy.timezone, Jakarta);
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = AttendancePolicy::from_settings(
            &map(&[
                (KEY_OFFICE_LATITUDE, "-6.2"),
                (KEY_OFFICE_LONGITUDE, "106.8"),
                (KEY_OFFICE_RADIUS_M, "150"),
                (KEY_OFFICE_START_TIME, "09:30"),
                (KEY_OFFICE_END_TIME, "18:00"),
                (KEY_LATE_GRACE_MINUTES, "10"),
                (KEY_TIMEZONE, "Asia/Makassar"),
            ]),
            Jakarta,
        );
        let fence = policy.geofence.unwrap();
        assert_eq!(fence.radius_m, 150.0);
        assert_eq!(fence.center, GeoPoint::new(-6.2, 106.8).unwrap());
        assert_eq!(policy.start_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(policy.end_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(policy.grace_minutes, 10);
        assert_eq!(policy.timezone, Makassar);
    }

    #[test]
    fn test_geofence_needs_all_three_values() {
        let partial = map(&[(KEY_OFFICE_LATITUDE, "-6.2"), (KEY_OFFICE_RADIUS_M, "150")]);
        assert!(AttendancePolicy::from_settings(&partial, Jakarta).geofence.is_none());

        let zero_radius = map(&[
            (KEY_OFFICE_LATITUDE, "-6.2"),
            (KEY_OFFICE_LONGITUDE, "106.8"),
            (KEY_OFFICE_RADIUS_M, "0"),
        ]);
        assert!(AttendancePolicy::from_settings(&zero_radius, Jakarta).geofence.is_none());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let policy = AttendancePolicy::from_settings(
            &map(&[(KEY_OFFICE_START_TIME, "8 am"), (KEY_TIMEZONE, "Mars/Olympus")]),
            Jakarta,
        );
        assert_eq!(policy.start_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(policy.timezone, Jakarta);
    }

    #[test]
    fn test_validate_system_setting() {
        assert!(validate_system_setting(KEY_OFFICE_LATITUDE, "-6.2").is_ok());
        assert!(validate_system_setting(KEY_OFFICE_START_TIME, "07:45").is_ok());
        assert!(validate_system_setting(KEY_TIMEZONE, "Asia/Jayapura").is_ok());

        let err = validate_system_setting(KEY_OFFICE_LATITUDE, "91").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSettingValue);
        let err = validate_system_setting(KEY_OFFICE_END_TIME, "25:00").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSettingValue);
        let err = validate_system_setting("favourite_colour", "blue").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownSetting);
    }

    #[test]
    fn test_validate_payroll_setting() {
        assert!(validate_payroll_setting(rates::KEY_JHT_EMPLOYEE_RATE, "0.02").is_ok());
        let err = validate_payroll_setting(rates::KEY_JHT_EMPLOYEE_RATE, "2").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSettingValue);
        let err = validate_payroll_setting(KEY_OFFICE_RADIUS_M, "100").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownSetting);
    }

    #[tokio::test]
    async fn test_update_rejects_whole_batch_on_bad_value() {
        let pool = test_pool().await;
        let err = update(
            &pool,
            SettingScope::System,
            1,
            map(&[(KEY_OFFICE_RADIUS_M, "100"), (KEY_OFFICE_START_TIME, "noon")]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSettingValue);
        assert!(get(&pool, SettingScope::System, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_then_load_policy() {
        let pool = test_pool().await;
        let stored = update(
            &pool,
            SettingScope::System,
            1,
            map(&[(KEY_OFFICE_END_TIME, " 16:30 "), (KEY_LATE_GRACE_MINUTES, "5")]),
        )
        .await
        .unwrap();
        assert_eq!(stored[KEY_OFFICE_END_TIME], "16:30");

        let policy = load_policy(&pool, 1, Jakarta).await.unwrap();
        assert_eq!(policy.end_time, NaiveTime::from_hms_opt(16, 30, 0).unwrap());
        assert_eq!(policy.grace_minutes, 5);

        let other = load_policy(&pool, 2, Jakarta).await.unwrap();
        assert_eq!(other.end_time, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
    }
}
