//! Access policy: who may run which operation

pub mod policy;

pub use policy::{AccessPolicy, Decision, Operation, Requirement};
