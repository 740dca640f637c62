//! Bounded retry for backend calls
//!
//! Only [`MeetbookError::Transient`] is retried. Everything else, including
//! seat preconditions such as `NoSeats`, goes straight back to the caller.

use std::future::Future;
use std::time::Duration;

use meetbook_common::{Backoff, Jitter, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy};
use meetbook_domain::{MeetbookError, ReservationConfig, Result};
use tracing::warn;

const MAX_BACKOFF: Duration = Duration::from_secs(1);

/// Retry condition: transient backend faults only
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientOnly;

impl RetryPolicy<MeetbookError> for TransientOnly {
    fn should_retry(&self, error: &MeetbookError, _attempt: u32) -> RetryDecision {
        if error.is_retryable() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// Retry wrapper shared by the core services
#[derive(Debug, Clone)]
pub struct TransientRetry {
    config: RetryConfig,
}

impl TransientRetry {
    /// Exponential backoff from `retry_base_delay_ms`, capped at one second.
    #[must_use]
    pub fn from_config(config: &ReservationConfig) -> Self {
        Self {
            config: RetryConfig {
                max_attempts: config.max_transient_retries.saturating_add(1),
                backoff: Backoff::Exponential {
                    initial: Duration::from_millis(config.retry_base_delay_ms),
                    factor: 2,
                    cap: MAX_BACKOFF,
                },
                jitter: Jitter::Equal,
            },
        }
    }

    /// Single attempt, no retry.
    #[must_use]
    pub fn disabled() -> Self {
        Self { config: RetryConfig::once() }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Run `operation`, retrying transient failures.
    ///
    /// Exhaustion surfaces as `Transient("<label> failed after N attempts: ...")`.
    pub async fn run<F, Fut, T>(&self, label: &'static str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        RetryExecutor::new(self.config.clone(), TransientOnly).execute(label, operation).await.map_err(
            |error| match error {
                RetryError::Exhausted { attempts, last } => {
                    warn!(operation = label, attempts, error = %last, "transient retries exhausted");
                    MeetbookError::Transient(format!("{label} failed after {attempts} attempts: {last}"))
                }
                RetryError::Aborted(error) => error,
                RetryError::InvalidConfig(message) => MeetbookError::Config(message),
            },
        )
    }
}

impl Default for TransientRetry {
    fn default() -> Self {
        Self::from_config(&ReservationConfig::default())
    }
}
