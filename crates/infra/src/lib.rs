//! # Meetbook Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories (r2d2 pool, WAL, compare-and-swap seat updates)
//! - In-memory repositories for the `memory` backend
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `meetbook-core`
//! - Contains all "impure" code (I/O, environment, global subscriber)

pub mod config;
pub mod database;
pub mod errors;
pub mod memory;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use database::*;
pub use errors::{InfraError, StorageError};
pub use memory::*;
pub use observability::init_tracing;
pub use storage::Storage;
