//! Attendance Model

use serde::{Deserialize, Serialize};

/// Arrival classification against the office start time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AttendanceStatus {
    Ontime,
    Late,
}

/// How an attendance record was closed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CheckoutType {
    /// Employee checked out themselves
    Manual,
    /// Closed by the sweep at the office end time
    Auto,
}

/// One attendance record per employee per local calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub company_id: i64,
    pub employee_id: i64,
    /// Local calendar date in the company time zone (YYYY-MM-DD)
    pub date: String,
    /// Check-in time (Unix millis)
    pub check_in: i64,
    /// Check-out time (Unix millis), null while open
    pub check_out: Option<i64>,
    pub checkout_type: Option<CheckoutType>,
    pub status: AttendanceStatus,
    pub latitude: f64,
    pub longitude: f64,
    /// Distance from the office at check-in, when a geofence is configured
    pub distance_m: Option<f64>,
    pub checkout_latitude: Option<f64>,
    pub checkout_longitude: Option<f64>,
    pub work_minutes: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Check-in payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Check-out payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Result of an auto-checkout sweep
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    pub closed: u64,
}
