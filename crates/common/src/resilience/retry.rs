//! Bounded retry executor
//!
//! An operation is attempted up to `max_attempts` times. After each failure
//! the [`RetryPolicy`] decides whether to go again; the wait comes from the
//! configured [`Backoff`] plus [`Jitter`].

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

/// Why an operation did not produce a value
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; `last` is the final one
    #[error("gave up after {attempts} attempts: {last:?}")]
    Exhausted { attempts: u32, last: E },

    /// The policy refused to retry this error
    #[error("not retryable: {0:?}")]
    Aborted(E),

    #[error("invalid retry configuration: {0}")]
    InvalidConfig(String),
}

impl<E> RetryError<E> {
    /// The operation's own error, when one was captured.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Aborted(error) => Some(error),
            Self::InvalidConfig(_) => None,
        }
    }
}

pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Decides, per failure, whether another attempt is worth making
pub trait RetryPolicy<E> {
    /// `attempt` is the 1-based number of the attempt that just failed.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the configured backoff, then retry
    Retry,
    Stop,
}

/// Delay before the n-th retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// `initial * factor^n`, never above `cap`
    Exponential { initial: Duration, factor: u32, cap: Duration },
}

impl Backoff {
    /// `retry` counts from 0 for the first retry.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { initial, factor, cap } => {
                initial.saturating_mul(factor.saturating_pow(retry)).min(cap)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    None,
    /// Uniform in `[delay / 2, delay]`
    Equal,
}

impl Jitter {
    #[must_use]
    pub fn apply(self, delay: Duration) -> Duration {
        match self {
            Self::None => delay,
            Self::Equal => {
                let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                Duration::from_millis(rand::thread_rng().gen_range(millis / 2..=millis))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts in total, the first one included
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub jitter: Jitter,
}

impl RetryConfig {
    /// A single attempt with no waiting.
    #[must_use]
    pub const fn once() -> Self {
        Self { max_attempts: 1, backoff: Backoff::Fixed(Duration::ZERO), jitter: Jitter::None }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if let Backoff::Exponential { factor: 0, .. } = self.backoff {
            return Err("exponential factor must be at least 1".to_string());
        }
        Ok(())
    }

    fn wait_before_retry(&self, decision: RetryDecision, retry: u32) -> Option<Duration> {
        match decision {
            RetryDecision::Stop => None,
            RetryDecision::Retry => Some(self.jitter.apply(self.backoff.delay_for(retry))),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Exponential {
                initial: Duration::from_millis(25),
                factor: 2,
                cap: Duration::from_secs(1),
            },
            jitter: Jitter::Equal,
        }
    }
}

/// Runs operations under one configuration and policy
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub const fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, the policy stops, or attempts run out.
    ///
    /// `label` only names the operation in log events.
    pub async fn execute<F, Fut, T, E>(&self, label: &str, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.config.validate().map_err(RetryError::InvalidConfig)?;

        let started = Instant::now();
        let mut attempt: u32 = 1;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            operation = label,
                            attempts = attempt,
                            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                            "succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let decision = self.policy.should_retry(&error, attempt);
            let Some(delay) = self.config.wait_before_retry(decision, attempt - 1) else {
                debug!(operation = label, attempt, error = ?error, "error is not retryable");
                return Err(RetryError::Aborted(error));
            };

            if attempt >= self.config.max_attempts {
                return Err(RetryError::Exhausted { attempts: attempt, last: error });
            }

            warn!(
                operation = label,
                attempt,
                max_attempts = self.config.max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = ?error,
                "attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
