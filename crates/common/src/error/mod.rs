//! Error classification
//!
//! Each crate keeps its own error enum. [`ErrorClassification`] is the part
//! they agree on: retry loops ask [`is_retryable`](ErrorClassification::is_retryable)
//! and log sites pick a level from [`severity`](ErrorClassification::severity),
//! without either knowing the concrete type.

use std::fmt;
use std::time::Duration;

/// How an error should be treated by retry and logging code
pub trait ErrorClassification {
    /// The same call may succeed later (busy database, drained pool, lost race)
    fn is_retryable(&self) -> bool;

    fn severity(&self) -> ErrorSeverity;

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Expected time until the condition clears, when the error knows one.
    ///
    /// Reported alongside the error in logs; retry loops keep their own backoff.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Expected outcome of a valid request (missing record, full meeting)
    Info,
    /// Degraded but recoverable (lock contention)
    Warning,
    Error,
    /// Stored data can no longer be trusted
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
