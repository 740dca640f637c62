//! Resilience patterns
//!
//! Bounded retry with backoff and jitter. Callers decide which errors are
//! worth retrying by implementing [`RetryPolicy`].

pub mod retry;

pub use retry::{
    Backoff, Jitter, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
    RetryResult,
};
