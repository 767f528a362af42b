//! Reusable field validators
//!
//! Each validator checks one trimmed string value and returns the reason
//! reported to the client when the value is rejected.

use crate::core::field::FieldFormat;

/// Validator: value must not be empty
pub fn not_empty() -> impl Fn(&str) -> Result<(), String> + Send + Sync + Clone {
    |value: &str| {
        if value.is_empty() {
            Err("must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

/// Validator: value must not exceed `max` characters
pub fn max_chars(max: usize) -> impl Fn(&str) -> Result<(), String> + Send + Sync + Clone {
    move |value: &str| {
        let len = value.chars().count();
        if len > max {
            Err(format!("must be at most {max} characters (got {len})"))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be one of the allowed names (case-sensitive)
pub fn one_of(
    allowed: &'static [&'static str],
) -> impl Fn(&str) -> Result<(), String> + Send + Sync + Clone {
    move |value: &str| {
        if allowed.contains(&value) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", allowed.join(", ")))
        }
    }
}

/// Validator: value must match a [`FieldFormat`]
pub fn format(format: FieldFormat) -> impl Fn(&str) -> Result<(), String> + Send + Sync + Clone {
    move |value: &str| {
        if format.validate(value) {
            Ok(())
        } else {
            Err(format.reason().to_string())
        }
    }
}
