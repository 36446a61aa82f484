//! Form validation errors

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Message shown when any required field is blank
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Per-field error messages keyed by the form's field name
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Record a "required" error when `value` is blank
    pub fn require(&mut self, field: &str, label: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, format!("{} is required", label));
            return false;
        }
        true
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A rejected form submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Summary suitable for a toast
    pub message: String,
    /// Inline messages per field
    pub fields: FieldErrors,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, fields: FieldErrors) -> Self {
        Self {
            message: message.into(),
            fields,
        }
    }

    /// Single-field error
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.add(field, message.clone());
        Self { message, fields }
    }
}

/// Result type alias for form validation
pub type ValidationResult<T> = Result<T, ValidationError>;
