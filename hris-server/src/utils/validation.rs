//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Person names, departments, positions
pub const MAX_NAME_LEN: usize = 200;

/// Notes, reasons, review comments
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: employee numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Upper bound for monthly salaries
pub const MAX_SALARY: f64 = 10_000_000_000.0;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Minimal email shape check: one `@` with text on both sides and a dot in the domain
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation(format!("Invalid email: {value}")));
    }
    Ok(())
}

/// Salary must be finite, non-negative and below [`MAX_SALARY`]
pub fn validate_salary(value: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation("base_salary must be a finite number"));
    }
    if !(0.0..=MAX_SALARY).contains(&value) {
        return Err(AppError::validation(format!(
            "base_salary must be between 0 and {MAX_SALARY}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Budi", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "reason", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "reason", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("siti@example.co.id").is_ok());
        assert!(validate_email("siti.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("siti@localhost").is_err());
    }

    #[test]
    fn test_salary() {
        assert!(validate_salary(8_500_000.0).is_ok());
        assert!(validate_salary(-1.0).is_err());
        assert!(validate_salary(f64::NAN).is_err());
    }
}
