//! Reusable field validators
//!
//! Validators run after coercion and report the failure kind only; the
//! human-readable message is attached by the [`FieldRule`](super::FieldRule)
//! that owns the check.

use super::schema::FailureKind;
use serde_json::Value;
use std::sync::Arc;
use validator::ValidateEmail;

/// A single check over a coerced field value
pub type Validator = Arc<dyn Fn(&str, &Value) -> Result<(), FailureKind> + Send + Sync>;

/// Validator: string is present and not empty
pub fn required() -> Validator {
    Arc::new(|_: &str, value: &Value| match value.as_str() {
        Some(s) if !s.is_empty() => Ok(()),
        _ => Err(FailureKind::InvalidType),
    })
}

/// Validator: number must be strictly greater than zero
pub fn positive() -> Validator {
    Arc::new(|_: &str, value: &Value| match value.as_f64() {
        Some(num) if num > 0.0 => Ok(()),
        Some(_) => Err(FailureKind::ConstraintViolation),
        None => Err(FailureKind::InvalidType),
    })
}

/// Validator: value must be in allowed list
pub fn in_list(allowed: &'static [&'static str]) -> Validator {
    Arc::new(move |_: &str, value: &Value| match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        _ => Err(FailureKind::InvalidType),
    })
}

/// Validator: string must be at least `min` characters long
pub fn min_length(min: usize) -> Validator {
    Arc::new(move |_: &str, value: &Value| match value.as_str() {
        Some(s) if s.chars().count() >= min => Ok(()),
        Some(_) => Err(FailureKind::ConstraintViolation),
        None => Err(FailureKind::InvalidType),
    })
}

/// Validator: string must look like an email address
pub fn email() -> Validator {
    Arc::new(|_: &str, value: &Value| match value.as_str() {
        Some(s) if s.to_owned().validate_email() => Ok(()),
        Some(_) => Err(FailureKind::ConstraintViolation),
        None => Err(FailureKind::InvalidType),
    })
}
