//! Meeting Store service - admin scheduling and read queries

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use meetbook_common::{check_field, RangeValidator, StringValidator};
use meetbook_domain::constants::MAX_MEETING_NAME_LENGTH;
use meetbook_domain::{
    day_bounds, parse_scheduled_at, CallerContext, Meeting, MeetbookError, MeetingId, NewMeeting,
    Result,
};
use tracing::{info, instrument};

use super::ports::MeetingRepository;
use crate::access::{AccessPolicy, Operation};
use crate::calendar::CalendarIndex;
use crate::retry::TransientRetry;

/// Meeting store operations, gated by the access policy
pub struct MeetingService {
    repository: Arc<dyn MeetingRepository>,
    calendar: Arc<CalendarIndex>,
    policy: AccessPolicy,
    retry: TransientRetry,
}

impl MeetingService {
    /// Create a new meeting service; `calendar` is rebuilt after every
    /// create and delete.
    pub fn new(repository: Arc<dyn MeetingRepository>, calendar: Arc<CalendarIndex>) -> Self {
        Self { repository, calendar, policy: AccessPolicy::new(), retry: TransientRetry::default() }
    }

    pub fn with_retry(mut self, retry: TransientRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Schedule a meeting. Admin only.
    #[instrument(skip(self, ctx, new_meeting), fields(name = %new_meeting.name))]
    pub async fn create(&self, ctx: &CallerContext, new_meeting: NewMeeting) -> Result<Meeting> {
        let admin = self.policy.require(ctx, Operation::CreateMeeting)?;

        let name = validate_name(&new_meeting.name)?;
        let capacity = validate_capacity(new_meeting.capacity)?;
        let scheduled_at = parse_scheduled_at(&new_meeting.scheduled_at)?;

        let meeting = Meeting::scheduled(name, scheduled_at, capacity, Utc::now());
        self.retry.run("insert_meeting", || self.repository.insert(meeting.clone())).await?;

        info!(
            meeting_id = %meeting.id,
            admin = %admin.user_id,
            capacity,
            scheduled_at = %meeting.scheduled_at,
            "meeting created"
        );

        self.calendar.refresh_after_mutation().await;
        Ok(meeting)
    }

    /// Delete a meeting and every reservation in it. Admin only.
    ///
    /// Deleting an id that no longer exists is `NotFound`, also on a second
    /// call for the same id.
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &CallerContext, id: MeetingId) -> Result<()> {
        let admin = self.policy.require(ctx, Operation::DeleteMeeting)?;

        let deleted = self.retry.run("delete_meeting", || self.repository.delete(id)).await?;
        if !deleted {
            return Err(not_found(id));
        }

        info!(meeting_id = %id, admin = %admin.user_id, "meeting deleted");
        self.calendar.refresh_after_mutation().await;
        Ok(())
    }

    pub async fn get(&self, ctx: &CallerContext, id: MeetingId) -> Result<Meeting> {
        self.policy.require(ctx, Operation::GetMeeting)?;
        self.retry
            .run("find_meeting", || self.repository.find_by_id(id))
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Meetings starting on `day` (UTC), ordered by start time.
    pub async fn list_by_day(&self, ctx: &CallerContext, day: NaiveDate) -> Result<Vec<Meeting>> {
        self.policy.require(ctx, Operation::ListByDay)?;
        meetings_on_day(self.repository.as_ref(), &self.retry, day).await
    }

    pub async fn list_all(&self, ctx: &CallerContext) -> Result<Vec<Meeting>> {
        self.policy.require(ctx, Operation::ListAll)?;
        let mut meetings =
            self.retry.run("list_all_meetings", || self.repository.list_all()).await?;
        sort_by_start(&mut meetings);
        Ok(meetings)
    }

    /// Change a meeting's display name. Admin only.
    #[instrument(skip(self, ctx, name))]
    pub async fn rename(&self, ctx: &CallerContext, id: MeetingId, name: &str) -> Result<Meeting> {
        let admin = self.policy.require(ctx, Operation::RenameMeeting)?;
        let name = validate_name(name)?;

        let meeting = self
            .retry
            .run("rename_meeting", || self.repository.rename(id, name.clone()))
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(meeting_id = %id, admin = %admin.user_id, version = meeting.version, "meeting renamed");
        Ok(meeting)
    }
}

/// Day query shared with the calendar's day selection.
pub(crate) async fn meetings_on_day(
    repository: &dyn MeetingRepository,
    retry: &TransientRetry,
    day: NaiveDate,
) -> Result<Vec<Meeting>> {
    let (start, end) = day_bounds(day);
    let mut meetings = retry.run("find_meetings_in_range", || repository.find_in_range(start, end)).await?;
    sort_by_start(&mut meetings);
    Ok(meetings)
}

fn sort_by_start(meetings: &mut [Meeting]) {
    meetings.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then_with(|| a.id.cmp(&b.id)));
}

fn validate_name(raw: &str) -> Result<String> {
    let validator = StringValidator::new().not_empty().max_length(MAX_MEETING_NAME_LENGTH);
    check_field("name", &validator, raw).map_err(MeetbookError::Validation)?;
    Ok(raw.trim().to_string())
}

fn validate_capacity(raw: i64) -> Result<u32> {
    let validator = RangeValidator::new(1, i64::from(u32::MAX));
    check_field("capacity", &validator, &raw).map_err(MeetbookError::Validation)?;
    u32::try_from(raw).map_err(|_| MeetbookError::Validation(format!("capacity: out of range: {raw}")))
}

fn not_found(id: MeetingId) -> MeetbookError {
    MeetbookError::NotFound(format!("meeting {id}"))
}
