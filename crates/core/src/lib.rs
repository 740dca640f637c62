//! # Meetbook Core
//!
//! Business logic of the meeting reservation engine - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for meetings, users and sessions
//! - The access policy table
//! - Services: meeting store, calendar index, reservation coordinator,
//!   session gate, registration
//!
//! ## Architecture Principles
//! - Depends only on `meetbook-domain` and `meetbook-common`
//! - No database code; storage arrives through the ports
//! - Every operation takes an explicit [`CallerContext`]
//!
//! [`CallerContext`]: meetbook_domain::CallerContext

pub mod access;
pub mod calendar;
pub mod meetings;
pub mod reservations;
pub mod retry;
pub mod session;
pub mod users;

pub use access::{AccessPolicy, Decision, Operation, Requirement};
pub use calendar::CalendarIndex;
pub use meetings::{MeetingRepository, MeetingService};
pub use reservations::ReservationCoordinator;
pub use retry::{TransientOnly, TransientRetry};
pub use session::{hash_token, SessionGate, SessionRepository};
pub use users::{RegistrationService, UserRepository};
