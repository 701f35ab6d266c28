//! Form field validators.
//!
//! A validator looks at a field's current value and either accepts it
//! (`Ok(())`) or returns one or more messages. An `Err` never carries an
//! empty list.

use regex::Regex;

use crate::value::Value;

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a value and returns the error messages if it is invalid.
    ///
    /// # Errors
    ///
    /// Returns the non-empty list of messages describing the problem.
    fn validate(&self, value: &Value) -> Result<(), Vec<String>>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), Vec<String>> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        self(value)
    }
}

/// Validator that requires a non-zero value.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    /// Creates a new RequiredValidator with default message.
    pub fn new() -> Self {
        Self {
            message: "This field is required.".to_string(),
        }
    }

    /// Creates a new RequiredValidator with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        if value.is_zero() {
            Err(vec![self.message.clone()])
        } else {
            Ok(())
        }
    }
}

/// Validator using a custom regex pattern.
///
/// The empty pattern matches every string.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
    message: String,
}

impl RegexValidator {
    /// Creates a new RegexValidator.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the pattern does not compile.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }
}

impl Validator for RegexValidator {
    /// # Panics
    ///
    /// Panics if the value is not a string. Attaching a regex to a
    /// non-text field is a programming error.
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        let Some(text) = value.as_str() else {
            panic!(
                "regex validator applied to a {} value; it only accepts strings",
                value.type_name()
            );
        };
        if self.pattern.is_match(text) {
            Ok(())
        } else {
            Err(vec![self.message.clone()])
        }
    }
}

/// Validator that enforces a maximum length.
///
/// Strings are measured in characters, lists in elements.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    max_length: usize,
    message: String,
}

impl MaxLengthValidator {
    /// Creates a new MaxLengthValidator.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Ensure this value has at most {max_length} characters."),
        }
    }

    /// Creates a new MaxLengthValidator with custom message.
    pub fn with_message(max_length: usize, message: impl Into<String>) -> Self {
        Self {
            max_length,
            message: message.into(),
        }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        match length(value) {
            Some(len) if len > self.max_length => Err(vec![self.message.clone()]),
            _ => Ok(()),
        }
    }
}

/// Validator that enforces a minimum length.
///
/// Strings are measured in characters, lists in elements.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    min_length: usize,
    message: String,
}

impl MinLengthValidator {
    /// Creates a new MinLengthValidator.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            message: format!("Ensure this value has at least {min_length} characters."),
        }
    }

    /// Creates a new MinLengthValidator with custom message.
    pub fn with_message(min_length: usize, message: impl Into<String>) -> Self {
        Self {
            min_length,
            message: message.into(),
        }
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        match length(value) {
            Some(len) if len < self.min_length => Err(vec![self.message.clone()]),
            _ => Ok(()),
        }
    }
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::List(items) => Some(items.len()),
        _ => None,
    }
}

/// Validator that runs every inner validator and collects all messages.
///
/// It does not stop at the first failure.
#[derive(Default)]
pub struct AllOf {
    validators: Vec<Box<dyn Validator>>,
}

impl std::fmt::Debug for AllOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllOf")
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl AllOf {
    /// Creates an empty combinator, which accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validator.
    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl Validator for AllOf {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .validators
            .iter()
            .filter_map(|v| v.validate(value).err())
            .flatten()
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Creates a validator for non-zero values.
pub fn required(message: impl Into<String>) -> RequiredValidator {
    RequiredValidator::with_message(message)
}

/// Creates a validator for strings matching `pattern`.
///
/// # Errors
///
/// Returns the regex error if the pattern does not compile.
pub fn regex(pattern: &str, message: impl Into<String>) -> Result<RegexValidator, regex::Error> {
    RegexValidator::new(pattern, message)
}

/// Combines validators; every one runs and all messages are collected.
pub fn and(validators: Vec<Box<dyn Validator>>) -> AllOf {
    AllOf { validators }
}
