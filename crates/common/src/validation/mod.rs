//! Field validation
//!
//! Validators return a bare message; [`check_field`] prefixes the field name
//! and callers wrap the result in their own error type.

mod validators;

pub use validators::{EmailValidator, FieldValidator, RangeValidator, StringValidator};

/// Run a validator and prefix its message with the field name.
pub fn check_field<T, V>(field: &str, validator: &V, value: &T) -> Result<(), String>
where
    T: ?Sized,
    V: FieldValidator<T> + ?Sized,
{
    validator.validate(value).map_err(|message| format!("{field}: {message}"))
}
