//! Calendar view commands

use meetbook_domain::{parse_day, CalendarMarkers, CallerContext, Meeting, Result as DomainResult};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Day markers for the calendar widget.
///
/// With `month = Some((year, month))` only that month's markers are returned.
pub async fn calendar_markers(
    ctx: &AppContext,
    caller: &CallerContext,
    month: Option<(i32, u32)>,
) -> DomainResult<CalendarMarkers> {
    execute_command("calendar::calendar_markers", async {
        match month {
            Some((year, month)) => ctx.calendar.markers_for_month(caller, year, month).await,
            None => ctx.calendar.view(caller).await,
        }
    })
    .await
}

/// The meetings on the day the user tapped, `day` formatted `YYYY-MM-DD`.
pub async fn select_day(
    ctx: &AppContext,
    caller: &CallerContext,
    day: &str,
) -> DomainResult<Vec<Meeting>> {
    execute_command("calendar::select_day", async {
        let day = parse_day(day)?;
        ctx.calendar.on_day_selected(caller, day).await
    })
    .await
}
