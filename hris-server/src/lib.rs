//! HRIS server: multi-tenant attendance, leave and payroll service
//!
//! # Overview
//!
//! - **Attendance** (`attendance`): geofenced check-in, lateness, auto-checkout sweep
//! - **Payroll** (`payroll`): BPJS contributions and progressive PPh21 per period
//! - **Leave** (`leave`): requests, reviews and cancellation
//! - **Auth** (`auth`): bearer JWT issued by the identity layer
//! - **HTTP API** (`api`): JSON REST endpoints
//!
//! # Layout
//!
//! ```text
//! hris-server/src/
//! ├── core/          # config, state, server, startup errors
//! ├── auth/          # JWT validation, CurrentUser extractor
//! ├── api/           # routes and handlers
//! ├── attendance/    # geofence, clock rules, attendance service
//! ├── payroll/       # rates, tax calculation, generation run
//! ├── db/            # SQLite pool, migrations, repositories, busy retry
//! └── utils/         # logging, time zones, validation
//! ```
//!
//! Every row belongs to a company; every query is scoped by the caller's
//! `company_id`.

pub mod activity;
pub mod api;
pub mod attendance;
pub mod auth;
pub mod core;
pub mod db;
pub mod employees;
pub mod leave;
pub mod notifications;
pub mod payroll;
pub mod settings;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` (when present) and read the configuration
pub fn setup_environment() -> core::Result<Config> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_dir.as_deref());
    config.validate()?;
    Ok(config)
}
