//! Validation helper functions for configuration types.

use crate::core::errors::{InlineError, Result};

/// Validate that an optional usize value, when present, is greater than zero.
pub fn validate_positive_usize(value: Option<usize>, field: &str) -> Result<()> {
    if value == Some(0) {
        return Err(InlineError::config_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate a normalized variable name. Names never contain `=` or NUL, so
/// entries such as `API_KEY=value` are rejected instead of silently matching nothing.
pub fn validate_variable_name(name: &str, field: &str) -> Result<()> {
    if name.is_empty() || name.contains(['=', '\0']) {
        return Err(InlineError::config_field(
            format!("'{}' is not a valid environment variable name", name),
            field,
        ));
    }
    Ok(())
}
