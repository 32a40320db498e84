//! Repository Module
//!
//! Free functions over a `SqlitePool` (or a transaction), one module per table.
//! Every query is scoped by `company_id`.

pub mod activity_log;
pub mod attendance;
pub mod employee;
pub mod leave;
pub mod notification;
pub mod payroll;
pub mod setting;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// SQLITE_BUSY / SQLITE_LOCKED after busy_timeout expired
    #[error("Database busy: {0}")]
    Busy(String),
}

/// Primary SQLite result codes for a locked database
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::PoolTimedOut => RepoError::Busy(err.to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return RepoError::Duplicate(db_err.message().to_string());
                }
                let primary = db_err
                    .code()
                    .and_then(|c| c.parse::<i32>().ok())
                    .map(|c| c & 0xff);
                if matches!(primary, Some(SQLITE_BUSY | SQLITE_LOCKED)) {
                    RepoError::Busy(db_err.message().to_string())
                } else {
                    RepoError::Database(err.to_string())
                }
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Busy(msg) => {
                tracing::warn!("Database busy: {msg}");
                AppError::new(ErrorCode::SystemBusy)
            }
            RepoError::Database(msg) => {
                tracing::error!("Database error: {msg}");
                AppError::database("Database error")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// `(rows, total)` for paginated listings
pub type Page<T> = (Vec<T>, u64);
