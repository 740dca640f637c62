//! Infrastructure error types
//!
//! Storage code works in terms of [`StorageError`], classified through
//! [`ErrorClassification`] so retry decisions do not depend on message text.
//! Everything leaving this crate is converted to
//! [`MeetbookError`](meetbook_domain::MeetbookError) by [`InfraError`].

mod conversions;

use std::time::Duration;

use meetbook_common::{ErrorClassification, ErrorSeverity};
use rusqlite::ffi::ErrorCode;
use thiserror::Error;

pub use conversions::{map_join_error, map_storage_error, InfraError};

/// Errors raised by the storage adapters
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("connection pool exhausted: {0}")]
    PoolExhausted(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("corrupt row: {0}")]
    CorruptRow(String),

    #[error("meeting {meeting_id} still contended after {attempts} attempts")]
    Contention { meeting_id: String, attempts: u32 },

    #[error("sqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("blocking task failed: {0}")]
    Join(String),
}

impl StorageError {
    pub(crate) fn corrupt(what: impl Into<String>) -> Self {
        Self::CorruptRow(what.into())
    }

    /// True for unique and primary key violations.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Rusqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == ErrorCode::ConstraintViolation
                    && matches!(err.extended_code, SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY)
            }
            _ => false,
        }
    }

    fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
                if matches!(err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        )
    }
}

const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

impl ErrorClassification for StorageError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::PoolExhausted(_) | Self::Contention { .. } => true,
            Self::Rusqlite(_) => self.is_busy(),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PoolExhausted(_) | Self::Contention { .. } => ErrorSeverity::Warning,
            Self::Rusqlite(_) if self.is_busy() => ErrorSeverity::Warning,
            Self::CorruptRow(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::PoolExhausted(_) => Some(Duration::from_millis(50)),
            _ => None,
        }
    }
}

impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        // Pool::get only fails once the checkout timeout elapses
        Self::PoolExhausted(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::ffi::Error as FfiError;

    use super::*;

    fn sqlite_failure(code: ErrorCode, extended_code: i32) -> StorageError {
        StorageError::Rusqlite(rusqlite::Error::SqliteFailure(
            FfiError { code, extended_code },
            None,
        ))
    }

    #[test]
    fn busy_and_locked_are_retryable() {
        assert!(sqlite_failure(ErrorCode::DatabaseBusy, 5).is_retryable());
        assert!(sqlite_failure(ErrorCode::DatabaseLocked, 6).is_retryable());
        assert_eq!(sqlite_failure(ErrorCode::DatabaseBusy, 5).severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn constraint_failures_are_not_retryable() {
        let err = sqlite_failure(ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_UNIQUE);
        assert!(!err.is_retryable());
        assert!(err.is_unique_violation());

        let fk = sqlite_failure(ErrorCode::ConstraintViolation, 787);
        assert!(!fk.is_unique_violation());
    }

    #[test]
    fn contention_and_pool_exhaustion_are_transient() {
        let contention = StorageError::Contention { meeting_id: "m".into(), attempts: 16 };
        assert!(contention.is_retryable());

        let pool = StorageError::PoolExhausted("timed out".into());
        assert!(pool.is_retryable());
        assert_eq!(pool.retry_after(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn corrupt_rows_are_critical() {
        let err = StorageError::corrupt("meetings.capacity out of range");
        assert!(err.is_critical());
        assert!(!err.is_retryable());
    }
}
