//! Meeting record and its seat transition
//!
//! [`Meeting::apply`] is the whole reservation state machine. It is pure:
//! given a snapshot and a change it either yields the complete next snapshot
//! or an error, never something in between. Storage adapters make the
//! read-apply-write cycle atomic per meeting.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{MeetingId, UserId};
use crate::errors::{MeetbookError, Result};
use crate::impl_domain_status_conversions;
use crate::utils::schedule::{day_of, stored_instant};

/// A scheduled, capacity-bounded event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub name: String,
    pub scheduled_at: DateTime<Utc>,
    pub capacity: u32,
    pub available_seats: u32,
    pub attendees: BTreeSet<UserId>,
    /// Bumped on every mutation; storage uses it for compare-and-swap
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

/// Admin input for [`Meeting`] creation, before validation
///
/// `scheduled_at` and `capacity` stay loosely typed so malformed client
/// input reaches validation instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeeting {
    pub name: String,
    pub scheduled_at: String,
    pub capacity: i64,
}

/// A single membership change against one meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum AttendanceChange {
    Join(UserId),
    Leave(UserId),
}

impl AttendanceChange {
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        match self {
            Self::Join(user_id) | Self::Leave(user_id) => user_id,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Leave(_) => "leave",
        }
    }
}

/// Per (meeting, identity) reservation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    NotJoined,
    Joined,
}

impl_domain_status_conversions!(ReservationState {
    NotJoined => "not_joined",
    Joined => "joined",
});

impl Meeting {
    /// A freshly scheduled meeting: every seat free, nobody attending.
    ///
    /// Both instants are cut to millisecond precision so the record reads
    /// back unchanged from any backend.
    #[must_use]
    pub fn scheduled(
        name: String,
        scheduled_at: DateTime<Utc>,
        capacity: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MeetingId::new(),
            name,
            scheduled_at: stored_instant(scheduled_at),
            capacity,
            available_seats: capacity,
            attendees: BTreeSet::new(),
            version: 0,
            created_at: stored_instant(created_at),
        }
    }

    /// UTC calendar day the meeting falls on
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        day_of(self.scheduled_at)
    }

    #[must_use]
    pub fn is_attending(&self, user_id: &UserId) -> bool {
        self.attendees.contains(user_id)
    }

    #[must_use]
    pub fn reservation_state(&self, user_id: &UserId) -> ReservationState {
        if self.is_attending(user_id) {
            ReservationState::Joined
        } else {
            ReservationState::NotJoined
        }
    }

    /// Compute the state after `change`.
    ///
    /// Precondition order for a join: membership first, then seats. A user
    /// already attending a full meeting gets `AlreadyJoined`, not `NoSeats`.
    pub fn apply(&self, change: &AttendanceChange) -> Result<Self> {
        let mut next = self.clone();

        match change {
            AttendanceChange::Join(user_id) => {
                if self.is_attending(user_id) {
                    return Err(MeetbookError::AlreadyJoined(format!(
                        "user {user_id} already holds a seat in meeting {}",
                        self.id
                    )));
                }
                if self.available_seats == 0 {
                    return Err(MeetbookError::NoSeats(format!(
                        "meeting {} is full ({} seats)",
                        self.id, self.capacity
                    )));
                }
                next.attendees.insert(user_id.clone());
                next.available_seats -= 1;
            }
            AttendanceChange::Leave(user_id) => {
                if !next.attendees.remove(user_id) {
                    return Err(MeetbookError::NotJoined(format!(
                        "user {user_id} holds no seat in meeting {}",
                        self.id
                    )));
                }
                next.available_seats = next.available_seats.checked_add(1).ok_or_else(|| {
                    MeetbookError::Internal(format!("seat counter overflow in meeting {}", self.id))
                })?;
            }
        }

        next.version = self.version.wrapping_add(1);
        next.check_invariants()?;
        Ok(next)
    }

    /// Same meeting under a new display name.
    #[must_use]
    pub fn renamed(&self, name: String) -> Self {
        Self { name, version: self.version.wrapping_add(1), ..self.clone() }
    }

    /// Verify the seat bookkeeping.
    ///
    /// `available_seats + |attendees| == capacity` and `capacity > 0`.
    pub fn check_invariants(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(MeetbookError::Internal(format!("meeting {} has zero capacity", self.id)));
        }

        let taken = u32::try_from(self.attendees.len()).unwrap_or(u32::MAX);
        if taken > self.capacity || self.available_seats != self.capacity - taken {
            return Err(MeetbookError::Internal(format!(
                "meeting {} seat bookkeeping broken: capacity={}, available={}, attendees={}",
                self.id, self.capacity, self.available_seats, taken
            )));
        }

        Ok(())
    }
}
