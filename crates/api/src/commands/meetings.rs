//! Meeting store commands

use meetbook_domain::{parse_day, CallerContext, Meeting, NewMeeting, Result as DomainResult};

use super::parse_meeting_id;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Create a meeting (admin only).
pub async fn create_meeting(
    ctx: &AppContext,
    caller: &CallerContext,
    input: NewMeeting,
) -> DomainResult<Meeting> {
    execute_command("meetings::create_meeting", ctx.meetings.create(caller, input)).await
}

/// Delete a meeting and its attendee list (admin only).
pub async fn delete_meeting(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
) -> DomainResult<()> {
    execute_command("meetings::delete_meeting", async {
        let id = parse_meeting_id(meeting_id)?;
        ctx.meetings.delete(caller, id).await
    })
    .await
}

/// Change a meeting's display name (admin only).
pub async fn rename_meeting(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
    name: &str,
) -> DomainResult<Meeting> {
    execute_command("meetings::rename_meeting", async {
        let id = parse_meeting_id(meeting_id)?;
        ctx.meetings.rename(caller, id, name).await
    })
    .await
}

pub async fn get_meeting(
    ctx: &AppContext,
    caller: &CallerContext,
    meeting_id: &str,
) -> DomainResult<Meeting> {
    execute_command("meetings::get_meeting", async {
        let id = parse_meeting_id(meeting_id)?;
        ctx.meetings.get(caller, id).await
    })
    .await
}

/// Meetings on one UTC day, `day` formatted `YYYY-MM-DD`.
pub async fn list_meetings_by_day(
    ctx: &AppContext,
    caller: &CallerContext,
    day: &str,
) -> DomainResult<Vec<Meeting>> {
    execute_command("meetings::list_meetings_by_day", async {
        let day = parse_day(day)?;
        ctx.meetings.list_by_day(caller, day).await
    })
    .await
}

pub async fn list_all_meetings(
    ctx: &AppContext,
    caller: &CallerContext,
) -> DomainResult<Vec<Meeting>> {
    execute_command("meetings::list_all_meetings", ctx.meetings.list_all(caller)).await
}
