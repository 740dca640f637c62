//! Seat reservation commands

use meetbook_domain::{CallerContext, Meeting, ReservationState, Result as DomainResult, UserId};

use super::parse_meeting_id;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Take a seat for the caller.
pub async fn join_meeting(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
) -> DomainResult<Meeting> {
    execute_command("reservations::join_meeting", async {
        let id = parse_meeting_id(meeting_id)?;
        ctx.reservations.join(caller, id).await
    })
    .await
}

/// Release the caller's seat.
pub async fn leave_meeting(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
) -> DomainResult<Meeting> {
    execute_command("reservations::leave_meeting", async {
        let id = parse_meeting_id(meeting_id)?;
        ctx.reservations.leave(caller, id).await
    })
    .await
}

/// Seat another user (admin only).
pub async fn add_attendee(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
    user_id: &str,
) -> DomainResult<Meeting> {
    execute_command("reservations::add_attendee", async {
        let id = parse_meeting_id(meeting_id)?;
        let user_id = UserId::parse(user_id)?;
        ctx.reservations.add_attendee(caller, id, user_id).await
    })
    .await
}

/// Remove another user's seat (admin only).
pub async fn remove_attendee(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
    user_id: &str,
) -> DomainResult<Meeting> {
    execute_command("reservations::remove_attendee", async {
        let id = parse_meeting_id(meeting_id)?;
        let user_id = UserId::parse(user_id)?;
        ctx.reservations.remove_attendee(caller, id, user_id).await
    })
    .await
}

/// Whether the caller holds a seat.
pub async fn reservation_status(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
) -> DomainResult<ReservationState> {
    execute_command("reservations::reservation_status", async {
        let id = parse_meeting_id(meeting_id)?;
        ctx.reservations.status(caller, id).await
    })
    .await
}
