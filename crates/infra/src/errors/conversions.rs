//! Conversions from storage errors into domain errors.

use meetbook_common::{ErrorClassification, ErrorSeverity};
use meetbook_domain::MeetbookError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

use super::StorageError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MeetbookError);

impl From<InfraError> for MeetbookError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MeetbookError> for InfraError {
    fn from(value: MeetbookError) -> Self {
        Self(value)
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → MeetbookError */
/* -------------------------------------------------------------------------- */

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        if value.is_retryable() {
            return Self(MeetbookError::Transient(value.to_string()));
        }

        let mapped = match value {
            StorageError::Rusqlite(SqlError::QueryReturnedNoRows) => {
                MeetbookError::NotFound("no rows returned by query".into())
            }
            StorageError::Rusqlite(SqlError::SqliteFailure(err, message)) => {
                MeetbookError::Database(format!(
                    "sqlite failure {:?} (code {}): {}",
                    err.code,
                    err.extended_code,
                    message.unwrap_or_default()
                ))
            }
            StorageError::Rusqlite(SqlError::FromSqlConversionFailure(_, _, cause)) => {
                MeetbookError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            StorageError::Rusqlite(SqlError::InvalidColumnType(_, name, ty)) => {
                MeetbookError::Database(format!("invalid column type for {name}: {ty}"))
            }
            StorageError::Join(message) => MeetbookError::Internal(message),
            other => MeetbookError::Database(other.to_string()),
        };

        Self(mapped)
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        StorageError::from(value).into()
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        StorageError::from(value).into()
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        StorageError::Join(value.to_string()).into()
    }
}

/// Convert a storage failure into the domain error, logging what gets lost.
pub fn map_storage_error(err: StorageError) -> MeetbookError {
    match err.severity() {
        ErrorSeverity::Critical => tracing::error!(error = %err, "storage integrity failure"),
        ErrorSeverity::Warning => tracing::debug!(
            error = %err,
            retry_after_ms = err.retry_after().map(|delay| delay.as_millis()),
            "transient storage failure"
        ),
        ErrorSeverity::Info | ErrorSeverity::Error => {}
    }
    InfraError::from(err).into()
}

pub fn map_join_error(err: JoinError) -> MeetbookError {
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
