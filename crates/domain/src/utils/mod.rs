//! Pure helper functions

pub mod schedule;
