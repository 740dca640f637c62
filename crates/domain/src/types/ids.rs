//! Identifier newtypes
//!
//! Meetings get a time-ordered UUIDv7 assigned at creation. Users keep the
//! opaque id issued by the external identity provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::MeetbookError;

/// Meeting identifier, immutable once assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(Uuid);

impl MeetingId {
    /// Allocate a fresh identifier
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MeetingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MeetingId {
    type Err = MeetbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| MeetbookError::Validation(format!("invalid meeting id: {s}")))
    }
}

/// Stable authentication identifier of a user
///
/// Meetings hold attendees by this key only; profile edits never touch
/// meeting records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an id that is already known to be well-formed (e.g. read back
    /// from storage).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse caller-supplied input; surrounding whitespace is dropped.
    pub fn parse(raw: &str) -> Result<Self, MeetbookError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MeetbookError::Validation("user id cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
