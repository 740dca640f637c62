//! Seat reservations
//!
//! Every membership change goes through
//! [`MeetingRepository::apply_attendance`], which evaluates the preconditions
//! and writes the new seat count and attendee set as one step. The
//! coordinator never reads a meeting and writes it back on its own.

use std::sync::Arc;

use meetbook_domain::{
    AttendanceChange, CallerContext, Meeting, MeetbookError, MeetingId, ReservationState, Result,
    UserId,
};
use tracing::{debug, info, instrument};

use crate::access::{AccessPolicy, Operation};
use crate::meetings::MeetingRepository;
use crate::retry::TransientRetry;

pub struct ReservationCoordinator {
    repository: Arc<dyn MeetingRepository>,
    policy: AccessPolicy,
    retry: TransientRetry,
}

impl ReservationCoordinator {
    pub fn new(repository: Arc<dyn MeetingRepository>) -> Self {
        Self { repository, policy: AccessPolicy::new(), retry: TransientRetry::default() }
    }

    pub fn with_retry(mut self, retry: TransientRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Reserve a seat for the calling identity.
    #[instrument(skip(self, ctx))]
    pub async fn join(&self, ctx: &CallerContext, meeting_id: MeetingId) -> Result<Meeting> {
        let identity = self.policy.require(ctx, Operation::Join)?;
        self.apply(meeting_id, AttendanceChange::Join(identity.user_id.clone())).await
    }

    /// Give up the calling identity's seat.
    #[instrument(skip(self, ctx))]
    pub async fn leave(&self, ctx: &CallerContext, meeting_id: MeetingId) -> Result<Meeting> {
        let identity = self.policy.require(ctx, Operation::Leave)?;
        self.apply(meeting_id, AttendanceChange::Leave(identity.user_id.clone())).await
    }

    /// Seat another user. Admin only; same preconditions as [`Self::join`].
    #[instrument(skip(self, ctx))]
    pub async fn add_attendee(
        &self,
        ctx: &CallerContext,
        meeting_id: MeetingId,
        user_id: UserId,
    ) -> Result<Meeting> {
        self.policy.require(ctx, Operation::AddAttendee)?;
        self.apply(meeting_id, AttendanceChange::Join(user_id)).await
    }

    /// Unseat another user. Admin only; same preconditions as [`Self::leave`].
    #[instrument(skip(self, ctx))]
    pub async fn remove_attendee(
        &self,
        ctx: &CallerContext,
        meeting_id: MeetingId,
        user_id: UserId,
    ) -> Result<Meeting> {
        self.policy.require(ctx, Operation::RemoveAttendee)?;
        self.apply(meeting_id, AttendanceChange::Leave(user_id)).await
    }

    /// Whether the calling identity holds a seat.
    pub async fn status(&self, ctx: &CallerContext, meeting_id: MeetingId) -> Result<ReservationState> {
        let identity = self.policy.require(ctx, Operation::ReservationStatus)?;
        let meeting = self
            .retry
            .run("find_meeting", || self.repository.find_by_id(meeting_id))
            .await?
            .ok_or_else(|| MeetbookError::NotFound(format!("meeting {meeting_id}")))?;
        Ok(meeting.reservation_state(&identity.user_id))
    }

    async fn apply(&self, meeting_id: MeetingId, change: AttendanceChange) -> Result<Meeting> {
        let outcome = self
            .retry
            .run("apply_attendance", || self.repository.apply_attendance(meeting_id, change.clone()))
            .await;

        match &outcome {
            Ok(meeting) => info!(
                meeting_id = %meeting_id,
                user_id = %change.user_id(),
                change = change.label(),
                available_seats = meeting.available_seats,
                version = meeting.version,
                "attendance updated"
            ),
            Err(err) if err.is_user_facing() => debug!(
                meeting_id = %meeting_id,
                user_id = %change.user_id(),
                change = change.label(),
                reason = err.label(),
                "attendance change rejected"
            ),
            Err(_) => {}
        }

        outcome
    }
}
