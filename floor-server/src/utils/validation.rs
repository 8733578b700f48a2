//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! 请求体结构的校验使用 `validator` derive，这里覆盖剩下的零散字段。

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: floor plan, customer, etc.
pub const MAX_NAME_LEN: usize = 100;

/// Notes, descriptions, reasons (cancellation reason, special occasion details, etc.)
pub const MAX_NOTE_LEN: usize = 1000;

/// Short identifiers: phone, color codes, labels
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
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
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}
