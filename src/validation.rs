//! Field-level write validation.
//!
//! Every resource builds a [`Validator`], records one [`FieldError`] per
//! violated constraint and turns the result into `ApiError::ValidationFailed`
//! when anything was recorded. Writes never proceed on a partial list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, message);
        }
        self
    }

    /// Length is counted in characters, not bytes.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize, message: &str) -> &mut Self {
        if value.chars().count() > max {
            self.push(field, message);
        }
        self
    }

    pub fn range(&mut self, field: &str, value: i64, min: i64, max: i64, message: &str) -> &mut Self {
        if value < min || value > max {
            self.push(field, message);
        }
        self
    }

    pub fn min(&mut self, field: &str, value: f64, min: f64, message: &str) -> &mut Self {
        if value < min {
            self.push(field, message);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !value.is_empty() && !is_valid_email(value) {
            self.push(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn finish(self) -> Result<(), crate::error::ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(crate::error::ApiError::validation_failed(self.errors))
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
