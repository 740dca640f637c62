//! Port interfaces for device sessions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_domain::{Result, Session};

/// Trait for session persistence, keyed by token hash
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: Session) -> Result<()>;

    async fn find(&self, token_hash: &str) -> Result<Option<Session>>;

    /// Record activity on a session; no-op if it is gone
    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> Result<()>;

    /// Remove a session; `false` if it did not exist
    async fn delete(&self, token_hash: &str) -> Result<bool>;
}
