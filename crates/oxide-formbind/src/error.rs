//! Error types for forms.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

/// Form-specific errors.
///
/// These are configuration errors: a declared field does not exist in the
/// bound data, or the data has an unsupported shape. They abort the current
/// operation instead of being shown to the person filling in the form.
#[derive(Debug, Error)]
pub enum FormError {
    /// The bound data is neither a record nor a map.
    #[error("form data must be a record or a map, got {0}")]
    UnsupportedContainer(&'static str),

    /// Two field definitions share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// A field path does not resolve against the bound data.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A value could not be stored at a field path.
    #[error("cannot store value for field {field}: {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },
}

/// Failure to locate a dotted path inside the bound data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A record has no field matching the segment.
    #[error("field {segment:?} not found while resolving {path:?}")]
    FieldNotFound { path: String, segment: String },

    /// A map has no entry for the segment.
    #[error("key {segment:?} not found while resolving {path:?}")]
    KeyNotFound { path: String, segment: String },

    /// A scalar value was reached with segments left over.
    #[error("cannot descend into {segment:?} of {path:?}: value is not a record or map")]
    NotAContainer { path: String, segment: String },

    /// An unset optional value was reached with segments left over.
    #[error("cannot descend into {segment:?} of {path:?}: value is unset")]
    NullIndirection { path: String, segment: String },

    /// The path is empty or contains an empty segment.
    #[error("empty segment in field path {0:?}")]
    EmptySegment(String),
}

/// Failure to turn submitted text into a slot's type.
///
/// During a fill these are reported as field errors, so the `Display`
/// output is what the submitter sees unless the coercion config overrides it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// Not an integer.
    #[error("{0:?} is not a whole number")]
    InvalidInt(String),

    /// Not a number.
    #[error("{0:?} is not a number")]
    InvalidFloat(String),

    /// Not a boolean under the strict policy.
    #[error("{0:?} is not a yes/no value")]
    InvalidBool(String),

    /// Not a date in any accepted format.
    #[error("{0:?} is not a valid date")]
    InvalidDate(String),

    /// Not a time of day in any accepted format.
    #[error("{0:?} is not a valid time")]
    InvalidTime(String),

    /// Not a date and time in any accepted format.
    #[error("{0:?} is not a valid date and time")]
    InvalidDateTime(String),

    /// Rejected by a type's own text parser.
    #[error("{input:?} is not valid: {message}")]
    Invalid { input: String, message: String },

    /// The number does not fit the slot's integer type.
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    /// The value's kind cannot be stored in the slot.
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The slot's kind cannot be filled from text.
    #[error("{0} values cannot be filled from a form")]
    Unsupported(&'static str),
}

/// Collection of validation errors by field.
///
/// The empty field name holds errors that belong to the whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    /// Errors keyed by field name.
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self {
            errors: HashMap::new(),
        }
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Appends several errors for a field.
    pub fn extend(&mut self, field: &str, messages: impl IntoIterator<Item = String>) {
        let mut messages = messages.into_iter().peekable();
        if messages.peek().is_some() {
            self.errors
                .entry(field.to_string())
                .or_default()
                .extend(messages);
        }
    }

    /// Removes every error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns the errors that are not attached to a field.
    pub fn form_errors(&self) -> &[String] {
        self.errors.get("").map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns all errors as a flat list, sorted by field name.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        let mut all: Vec<(&str, &str)> = self
            .errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, message) in self.all_errors() {
            if field.is_empty() {
                writeln!(f, "{message}")?;
            } else {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut errors = ValidationErrors::new();
        errors.add("Name", "Required.");
        errors.add("Name", "Too short.");
        errors.add("", "Username taken.");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("Name"),
            Some(&vec!["Required.".to_string(), "Too short.".to_string()])
        );
        assert_eq!(errors.form_errors(), ["Username taken.".to_string()]);
    }

    #[test]
    fn test_extend_ignores_empty() {
        let mut errors = ValidationErrors::new();
        errors.extend("Age", Vec::new());
        assert!(errors.is_empty());

        errors.extend("Age", vec!["Bad.".to_string()]);
        assert_eq!(errors.get("Age").map(Vec::len), Some(1));
    }

    #[test]
    fn test_display_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("b", "second");
        errors.add("a", "first");
        errors.add("", "whole form");
        assert_eq!(errors.to_string(), "whole form\na: first\nb: second\n");
    }

    #[test]
    fn test_coercion_error_display() {
        let err = CoercionError::InvalidInt("abc".to_string());
        assert_eq!(err.to_string(), "\"abc\" is not a whole number");
    }
}
