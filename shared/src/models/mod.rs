//! HR data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps Unix millis.

pub mod activity_log;
pub mod attendance;
pub mod employee;
pub mod leave;
pub mod notification;
pub mod payroll;
pub mod setting;
pub mod user;

// Re-exports
pub use activity_log::*;
pub use attendance::*;
pub use employee::*;
pub use leave::*;
pub use notification::*;
pub use payroll::*;
pub use setting::*;
pub use user::*;
