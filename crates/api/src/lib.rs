//! # Meetbook API
//!
//! Application layer - commands, application context and the operator CLI.
//!
//! This crate contains:
//! - Commands (client → engine bridge)
//! - Application context (dependency injection)
//! - Operator binary (`meetbook`)
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
