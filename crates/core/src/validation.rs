//! Explicit request validation.
//!
//! Request types validate themselves by feeding each field through a
//! [`FieldValidator`], which collects at most one human-readable reason per
//! field and converts into [`CoreError::Validation`].

use std::collections::BTreeMap;

use validator::ValidateEmail;

use crate::error::CoreError;

/// Field name -> reason. Ordered so error payloads are deterministic.
pub type FieldErrors = BTreeMap<String, String>;

/// Accumulates field-level validation failures.
///
/// Only the first failure recorded for a field is kept.
#[derive(Debug, Default)]
pub struct FieldValidator {
    errors: FieldErrors,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field` unless one is already present.
    pub fn reject(&mut self, field: &str, reason: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| reason.into());
        self
    }

    /// The field must be present and non-blank.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.reject(field, "This field is required");
        }
        self
    }

    /// The field must be present and between `min` and `max` characters.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        self.required(field, value);
        let len = value.chars().count();
        if len < min {
            self.reject(field, format!("Must be at least {min} characters"));
        } else if len > max {
            self.reject(field, format!("Must be at most {max} characters"));
        }
        self
    }

    /// The field must be present and a syntactically valid email address.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !value.to_owned().validate_email() {
            self.reject(field, "Invalid email format");
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was rejected, otherwise [`CoreError::Validation`].
    pub fn finish(self) -> Result<(), CoreError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.errors))
        }
    }
}
