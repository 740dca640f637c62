// Field validators used at the service edge
use std::fmt::Display;

use once_cell::sync::Lazy;
use regex::Regex;

/// A check over one field value; the error is a message without the field name
pub trait FieldValidator<T: ?Sized> {
    fn validate(&self, value: &T) -> Result<(), String>;
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy)]
pub struct RangeValidator<T> {
    min: T,
    max: T,
}

impl<T> RangeValidator<T>
where
    T: PartialOrd + Display,
{
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T> FieldValidator<T> for RangeValidator<T>
where
    T: PartialOrd + Display,
{
    fn validate(&self, value: &T) -> Result<(), String> {
        if *value < self.min || *value > self.max {
            return Err(format!("must be between {} and {}, got {value}", self.min, self.max));
        }
        Ok(())
    }
}

/// Text bounds, checked on the trimmed value.
///
/// Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringValidator {
    required: bool,
    max_chars: Option<usize>,
}

impl StringValidator {
    pub const fn new() -> Self {
        Self { required: false, max_chars: None }
    }

    /// Reject empty and whitespace-only values
    #[must_use]
    pub const fn not_empty(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn max_length(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }
}

impl FieldValidator<str> for StringValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let trimmed = value.trim();

        if self.required && trimmed.is_empty() {
            return Err("must not be empty".to_string());
        }

        match self.max_chars {
            Some(max) if trimmed.chars().count() > max => {
                Err(format!("must be at most {max} characters"))
            }
            _ => Ok(()),
        }
    }
}

impl FieldValidator<String> for StringValidator {
    fn validate(&self, value: &String) -> Result<(), String> {
        FieldValidator::<str>::validate(self, value)
    }
}

static EMAIL_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Plain `local@domain.tld` addresses; no display names or quoted parts
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl EmailValidator {
    pub const fn new() -> Self {
        Self
    }
}

impl FieldValidator<str> for EmailValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        match EMAIL_REGEX.as_ref() {
            Some(re) if re.is_match(value) => Ok(()),
            Some(_) => Err(format!("not a valid address: {value}")),
            None => Err("address pattern failed to compile".to_string()),
        }
    }
}

impl FieldValidator<String> for EmailValidator {
    fn validate(&self, value: &String) -> Result<(), String> {
        FieldValidator::<str>::validate(self, value)
    }
}
