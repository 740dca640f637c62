//! Session repository implementation using SQLite
//!
//! Rows are keyed by the token hash; the raw token never reaches this layer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_core::session::ports::SessionRepository as SessionRepositoryPort;
use meetbook_domain::{MeetbookError, Result as DomainResult, Session, UserId};
use rusqlite::{params, OptionalExtension};
use tokio::task;

use super::manager::DbManager;
use crate::errors::{map_join_error, map_storage_error, StorageError};

/// SQLite-backed implementation of `SessionRepository`
pub struct SqliteSessionRepository {
    db: Arc<DbManager>,
}

impl SqliteSessionRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepositoryPort for SqliteSessionRepository {
    async fn insert(&self, session: Session) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO sessions (token_hash, user_id, created_at_ms, last_seen_at_ms)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token_hash,
                    session.user_id.as_str(),
                    session.created_at.timestamp_millis(),
                    session.last_seen_at.timestamp_millis(),
                ],
            )
            .map_err(|err| map_storage_error(err.into()))?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find(&self, token_hash: &str) -> DomainResult<Option<Session>> {
        let db = Arc::clone(&self.db);
        let token_hash = token_hash.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<Session>> {
            let conn = db.get_connection()?;
            let row = conn
                .query_row(
                    "SELECT user_id, created_at_ms, last_seen_at_ms FROM sessions WHERE token_hash = ?1",
                    params![&token_hash],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()
                .map_err(|err| map_storage_error(err.into()))?;

            row.map(|(user_id, created_at_ms, last_seen_at_ms)| -> DomainResult<Session> {
                Ok(Session {
                    token_hash: token_hash.clone(),
                    user_id: UserId::new(user_id),
                    created_at: from_millis(created_at_ms)?,
                    last_seen_at: from_millis(last_seen_at_ms)?,
                })
            })
            .transpose()
        })
        .await
        .map_err(map_join_error)?
    }

    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let token_hash = token_hash.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "UPDATE sessions SET last_seen_at_ms = ?1 WHERE token_hash = ?2",
                params![at.timestamp_millis(), &token_hash],
            )
            .map_err(|err| map_storage_error(err.into()))?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete(&self, token_hash: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let token_hash = token_hash.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let removed = conn
                .execute("DELETE FROM sessions WHERE token_hash = ?1", params![&token_hash])
                .map_err(|err| map_storage_error(err.into()))?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn from_millis(ms: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| -> MeetbookError {
        map_storage_error(StorageError::corrupt(format!("sessions timestamp {ms} out of range")))
    })
}
