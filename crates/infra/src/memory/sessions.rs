//! Session storage keyed by token hash

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use meetbook_core::session::ports::SessionRepository;
use meetbook_domain::{Result, Session};

#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: DashMap<String, Session>,
}

impl MemorySessionRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn insert(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(token_hash).map(|entry| entry.value().clone()))
    }

    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(mut entry) = self.sessions.get_mut(token_hash) {
            entry.last_seen_at = at;
        }
        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> Result<bool> {
        Ok(self.sessions.remove(token_hash).is_some())
    }
}
