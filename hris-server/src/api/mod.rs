//! HTTP API
//!
//! - [`health`] - liveness and database check
//! - [`attendance`] - check-in/check-out, daily record, listing, sweep
//! - [`employees`] - employee records
//! - [`payroll`] - generation, payslips, status changes, payroll settings
//! - [`leave`] - leave requests and reviews
//! - [`notifications`] - the caller's notifications
//! - [`settings`] - company system settings
//! - [`activity_log`] - audit trail

pub mod activity_log;
pub mod attendance;
pub mod employees;
pub mod health;
pub mod leave;
pub mod notifications;
pub mod payroll;
pub mod settings;

use axum::Router;
use serde::Serialize;

use crate::core::ServerState;

/// All routes, without middleware layers
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(attendance::router())
        .merge(employees::router())
        .merge(payroll::router())
        .merge(leave::router())
        .merge(notifications::router())
        .merge(settings::router())
        .merge(activity_log::router())
}

/// `{ "updated": n }` for bulk updates
#[derive(Debug, Serialize)]
pub struct UpdatedCount {
    pub updated: u64,
}
