//! Reservation Coordinator: seat membership state machine

pub mod coordinator;

pub use coordinator::ReservationCoordinator;
