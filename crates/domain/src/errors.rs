//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Meetbook
///
/// Serialized as `{"type": "<Variant>", "message": "..."}` so callers can
/// branch on the kind without parsing the message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MeetbookError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Already joined: {0}")]
    AlreadyJoined(String),

    #[error("Not joined: {0}")]
    NotJoined(String),

    #[error("No seats available: {0}")]
    NoSeats(String),

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MeetbookError {
    /// Only backend unavailability is eligible for automatic retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Stable snake_case label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::AlreadyJoined(_) => "already_joined",
            Self::NotJoined(_) => "not_joined",
            Self::NoSeats(_) => "no_seats",
            Self::Transient(_) => "transient",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Precondition failures that leave state untouched and are reported
    /// to the user rather than treated as faults.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound(_)
                | Self::Forbidden(_)
                | Self::AlreadyJoined(_)
                | Self::NotJoined(_)
                | Self::NoSeats(_)
        )
    }
}

/// Result type alias for Meetbook operations
pub type Result<T> = std::result::Result<T, MeetbookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_is_retryable() {
        assert!(MeetbookError::Transient("busy".into()).is_retryable());
        assert!(!MeetbookError::NoSeats("full".into()).is_retryable());
        assert!(!MeetbookError::Database("corrupt".into()).is_retryable());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(MeetbookError::Forbidden("admin only".into()))
            .expect("serialize error");
        assert_eq!(json["type"], "Forbidden");
        assert_eq!(json["message"], "admin only");

        let back: MeetbookError = serde_json::from_value(json).expect("deserialize error");
        assert_eq!(back.label(), "forbidden");
    }

    #[test]
    fn user_facing_kinds_exclude_faults() {
        assert!(MeetbookError::AlreadyJoined("x".into()).is_user_facing());
        assert!(!MeetbookError::Transient("x".into()).is_user_facing());
        assert!(!MeetbookError::Internal("x".into()).is_user_facing());
    }
}
