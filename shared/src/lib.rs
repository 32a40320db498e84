//! Shared types for the HRIS service
//!
//! Common types used by the server and API clients: error codes,
//! HR data models, pagination envelopes and ID/time utilities.

pub mod error;
pub mod models;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use pagination::{PageMeta, PageQuery, Paginated};
