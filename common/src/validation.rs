// Input validation for repository create/update

use crate::errors::ValidationError;
use crate::models::{RepositoryFields, RepositoryInput};

/// Message reported for a missing or empty required field
pub fn required_message(field: &str) -> String {
    format!("The {} field is required.", field)
}

/// Checks that a field is present and non-empty.
///
/// Whitespace-only values count as empty, but accepted values are returned
/// untouched: no trimming, no normalization.
fn required(field: &str, value: Option<String>, errors: &mut ValidationError) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            errors.add(field, required_message(field));
            None
        }
    }
}

impl RepositoryInput {
    /// Validate both fields, reporting every failing field at once
    pub fn validate(self) -> Result<RepositoryFields, ValidationError> {
        let mut errors = ValidationError::new();

        let url = required("url", self.url, &mut errors);
        let description = required("description", self.description, &mut errors);

        match (url, description) {
            (Some(url), Some(description)) => Ok(RepositoryFields { url, description }),
            _ => Err(errors),
        }
    }
}
