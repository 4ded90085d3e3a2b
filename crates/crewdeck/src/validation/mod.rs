// File: src/validation/mod.rs
// Purpose: Validation result type shared by schema and auth checks

use std::collections::HashMap;

pub mod validators;

/// Result of validation with per-field errors
///
/// Each field can accumulate multiple error messages.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    errors: HashMap<String, Vec<String>>,
}

impl ValidationResult {
    /// Create an empty (passing) validation result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get first error for a specific field
    pub fn get_error(&self, field: &str) -> Option<&String> {
        self.errors.get(field).and_then(|errors| errors.first())
    }

    /// Get all errors for a specific field
    pub fn get_errors(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn into_errors(self) -> HashMap<String, Vec<String>> {
        self.errors
    }

    /// Convert into a Result, erroring with the field map when invalid
    pub fn into_result(self) -> Result<(), crate::error::ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::error::ValidationError::new(self.errors))
        }
    }
}
