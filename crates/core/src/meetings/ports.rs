//! Port interfaces for meeting storage
//!
//! These traits define the boundary between the meeting services and the
//! storage adapters in `meetbook-infra`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_domain::{AttendanceChange, Meeting, MeetingId, Result};

/// Trait for meeting persistence and retrieval
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Persist a freshly scheduled meeting
    async fn insert(&self, meeting: Meeting) -> Result<()>;

    /// Get a meeting with its attendees
    async fn find_by_id(&self, id: MeetingId) -> Result<Option<Meeting>>;

    /// Meetings with `start <= scheduled_at < end`, ordered by `scheduled_at`
    async fn find_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Meeting>>;

    /// Every meeting, ordered by `scheduled_at`
    async fn list_all(&self) -> Result<Vec<Meeting>>;

    /// Delete a meeting and its attendee rows; `false` if it did not exist
    async fn delete(&self, id: MeetingId) -> Result<bool>;

    /// Replace the display name, bumping `version`; `None` if absent
    async fn rename(&self, id: MeetingId, name: String) -> Result<Option<Meeting>>;

    /// Apply one attendance change atomically.
    ///
    /// Implementations must make the read, [`Meeting::apply`] and write a
    /// single linearizable step per meeting: either the returned state is
    /// stored in full or nothing changes. Fails with `NotFound` for an
    /// unknown meeting and passes through the precondition errors of
    /// [`Meeting::apply`].
    async fn apply_attendance(&self, id: MeetingId, change: AttendanceChange) -> Result<Meeting>;
}
