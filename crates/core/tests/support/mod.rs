//! Shared test helpers for `meetbook-core` integration tests.
//!
//! In-memory mocks for the storage ports plus fixtures that wire the
//! services together the way the application context does.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
