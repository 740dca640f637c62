//! Command surface - the client-facing entry points
//!
//! Each command takes the [`AppContext`](crate::AppContext), the caller's
//! [`CallerContext`](meetbook_domain::CallerContext) and loosely typed
//! client input. Parsing happens here; authorization and business rules live
//! in `meetbook-core`.

mod accounts;
mod calendar;
mod meetings;
mod reservations;

pub use accounts::*;
pub use calendar::*;
pub use meetings::*;
pub use reservations::*;

use meetbook_domain::{MeetingId, Result as DomainResult};

/// Parse a client-supplied meeting id; malformed ids are `Validation` errors.
fn parse_meeting_id(raw: &str) -> DomainResult<MeetingId> {
    raw.parse()
}
