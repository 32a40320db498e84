//! Unified error codes for the HRIS service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors
//! - 4xxx: Attendance errors
//! - 5xxx: Leave errors
//! - 6xxx: Payroll errors
//! - 7xxx: Settings errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin or owner role required
    AdminRequired = 2003,

    // ==================== 3xxx: Tenant ====================
    /// Resource belongs to another company
    TenantMismatch = 3001,

    // ==================== 4xxx: Attendance ====================
    /// Attendance record not found
    AttendanceNotFound = 4001,
    /// Employee already checked in today
    AlreadyCheckedIn = 4002,
    /// No open check-in to close
    NotCheckedIn = 4003,
    /// Check-in location is outside the office radius
    OutsideGeofence = 4004,
    /// Coordinates are missing or out of range
    InvalidCoordinates = 4005,

    // ==================== 5xxx: Leave ====================
    /// Leave request not found
    LeaveNotFound = 5001,
    /// Leave request overlaps an existing one
    LeaveOverlap = 5002,
    /// Leave request is not in a state that allows this action
    LeaveInvalidStatus = 5003,
    /// Leave date range is invalid
    LeaveInvalidRange = 5004,

    // ==================== 6xxx: Payroll ====================
    /// Payroll record not found
    PayrollNotFound = 6001,
    /// Payroll record is not in a state that allows this action
    PayrollInvalidStatus = 6002,
    /// Payroll period is invalid
    PayrollInvalidPeriod = 6003,
    /// Tax status code is not recognised
    InvalidTaxStatus = 6004,

    // ==================== 7xxx: Settings ====================
    /// Unknown setting key
    UnknownSetting = 7001,
    /// Setting value has the wrong type or range
    InvalidSettingValue = 7002,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Email already used in this company
    EmployeeEmailExists = 8002,
    /// Employee number already used in this company
    EmployeeNumberExists = 8003,
    /// Notification not found
    NotificationNotFound = 8201,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Database busy, retry later
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric value of this error code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this code represents success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Tenant
            ErrorCode::TenantMismatch => "Resource belongs to another company",

            // Attendance
            ErrorCode::AttendanceNotFound => "Attendance record not found",
            ErrorCode::AlreadyCheckedIn => "Already checked in today",
            ErrorCode::NotCheckedIn => "No open check-in for today",
            ErrorCode::OutsideGeofence => "Location is outside the office radius",
            ErrorCode::InvalidCoordinates => "Latitude and longitude are required",

            // Leave
            ErrorCode::LeaveNotFound => "Leave request not found",
            ErrorCode::LeaveOverlap => "Leave request overlaps an existing request",
            ErrorCode::LeaveInvalidStatus => "Leave request cannot change from its current status",
            ErrorCode::LeaveInvalidRange => "Leave end date must not precede start date",

            // Payroll
            ErrorCode::PayrollNotFound => "Payroll not found",
            ErrorCode::PayrollInvalidStatus => "Payroll cannot change from its current status",
            ErrorCode::PayrollInvalidPeriod => "Invalid payroll period",
            ErrorCode::InvalidTaxStatus => "Invalid tax status",

            // Settings
            ErrorCode::UnknownSetting => "Unknown setting key",
            ErrorCode::InvalidSettingValue => "Invalid setting value",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeEmailExists => "Email is already registered",
            ErrorCode::EmployeeNumberExists => "Employee number is already in use",
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Tenant
            3001 => Ok(ErrorCode::TenantMismatch),

            // Attendance
            4001 => Ok(ErrorCode::AttendanceNotFound),
            4002 => Ok(ErrorCode::AlreadyCheckedIn),
            4003 => Ok(ErrorCode::NotCheckedIn),
            4004 => Ok(ErrorCode::OutsideGeofence),
            4005 => Ok(ErrorCode::InvalidCoordinates),

            // Leave
            5001 => Ok(ErrorCode::LeaveNotFound),
            5002 => Ok(ErrorCode::LeaveOverlap),
            5003 => Ok(ErrorCode::LeaveInvalidStatus),
            5004 => Ok(ErrorCode::LeaveInvalidRange),

            // Payroll
            6001 => Ok(ErrorCode::PayrollNotFound),
            6002 => Ok(ErrorCode::PayrollInvalidStatus),
            6003 => Ok(ErrorCode::PayrollInvalidPeriod),
            6004 => Ok(ErrorCode::InvalidTaxStatus),

            // Settings
            7001 => Ok(ErrorCode::UnknownSetting),
            7002 => Ok(ErrorCode::InvalidSettingValue),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::EmployeeEmailExists),
            8003 => Ok(ErrorCode::EmployeeNumberExists),
            8201 => Ok(ErrorCode::NotificationNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
