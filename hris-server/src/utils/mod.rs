//! Utilities: error re-exports, logging, time zone helpers, input validation

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
