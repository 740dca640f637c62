//! # Meetbook Domain
//!
//! Business domain types and models for Meetbook.
//!
//! This crate contains:
//! - Domain data types (Meeting, User, Identity, Session, DayMarker)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Meetbook crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures; the seat transition
//!   ([`Meeting::apply`]) lives here because it has no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::schedule::{day_bounds, day_of, parse_day, parse_scheduled_at, stored_instant};
