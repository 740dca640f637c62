//! Session Gate: device tokens ↔ caller identity

pub mod gate;
pub mod ports;

pub use gate::{hash_token, SessionGate};
pub use ports::SessionRepository;
