use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | DATABASE_PATH | hris.db | SQLite database file |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development, staging or production |
/// | DEFAULT_TIMEZONE | Asia/Jakarta | Fallback company time zone |
/// | JWT_SECRET | (generated in development) | HS256 shared secret, at least 32 chars |
/// | JWT_ISSUER | hris | Expected `iss` claim |
/// | JWT_AUDIENCE | hris-dashboard | Expected `aud` claim |
/// | LOG_LEVEL | info | Default log level when `RUST_LOG` is unset |
/// | LOG_DIR | (unset) | Daily rolling log files when set |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
///
/// ```ignore
/// DATABASE_PATH=/data/hris.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// Used when a company has no `timezone` setting
    pub default_timezone: Tz,
    pub jwt: JwtConfig,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "hris.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            default_timezone: std::env::var("DEFAULT_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Asia::Jakarta),
            jwt: JwtConfig::from_env(environment == "development"),
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        }
    }

    /// Configuration for tests: in-memory database, fixed secret
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 0,
            environment: "test".into(),
            default_timezone: chrono_tz::Asia::Jakarta,
            jwt: JwtConfig {
                secret: "test-secret-that-is-at-least-32-bytes-long".into(),
                issuer: "hris".into(),
                audience: "hris-dashboard".into(),
            },
            log_level: "debug".into(),
            log_dir: None,
            request_timeout_ms: 30000,
        }
    }

    /// Reject configurations that must not reach production
    pub fn validate(&self) -> Result<(), ServerError> {
        if !self.is_development() && self.jwt.secret.len() < 32 {
            return Err(ServerError::Config(
                "JWT_SECRET must be set and at least 32 characters long".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ServerError::Config("REQUEST_TIMEOUT_MS must be positive".into()));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected_outside_development() {
        let mut config = Config::for_tests();
        config.environment = "production".into();
        config.jwt.secret = "short".into();
        assert!(config.validate().is_err());

        config.environment = "development".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_is_valid() {
        assert!(Config::for_tests().validate().is_ok());
        assert!(!Config::for_tests().is_production());
    }
}
