//! Modular common utilities shared across Meetbook crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification and field validators
//! - `runtime`: async retry executor (tokio + tracing)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod validation;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::{
    Backoff, Jitter, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
    RetryResult,
};
#[cfg(feature = "foundation")]
pub use validation::{check_field, EmailValidator, FieldValidator, RangeValidator, StringValidator};
