//! Backend selection
//!
//! Builds the three repository ports for the configured
//! [`StorageBackend`]. Services only ever see the trait objects.

use std::sync::Arc;

use meetbook_core::{MeetingRepository, SessionRepository, UserRepository};
use meetbook_domain::{Config, Result, StorageBackend};
use tracing::info;

use crate::database::{
    DbManager, SqliteMeetingRepository, SqliteSessionRepository, SqliteUserRepository,
};
use crate::memory::{MemoryMeetingRepository, MemorySessionRepository, MemoryUserRepository};

/// Repository set sharing one backend
#[derive(Clone)]
pub struct Storage {
    pub meetings: Arc<dyn MeetingRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    /// Present for the SQLite backend only
    pub db: Option<Arc<DbManager>>,
}

impl Storage {
    /// Open the configured backend; SQLite migrations run here.
    pub fn open(config: &Config) -> Result<Self> {
        match config.database.storage_backend {
            StorageBackend::Sqlite => {
                let db = Arc::new(DbManager::from_config(&config.database)?);
                db.run_migrations()?;
                Ok(Self::sqlite(db, config.reservations.max_cas_attempts))
            }
            StorageBackend::Memory => {
                info!("using in-memory storage; data is lost on exit");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn sqlite(db: Arc<DbManager>, max_cas_attempts: u32) -> Self {
        Self {
            meetings: Arc::new(
                SqliteMeetingRepository::new(Arc::clone(&db))
                    .with_max_cas_attempts(max_cas_attempts),
            ),
            users: Arc::new(SqliteUserRepository::new(Arc::clone(&db))),
            sessions: Arc::new(SqliteSessionRepository::new(Arc::clone(&db))),
            db: Some(db),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            meetings: Arc::new(MemoryMeetingRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
            sessions: Arc::new(MemorySessionRepository::new()),
            db: None,
        }
    }

    #[must_use]
    pub const fn backend(&self) -> StorageBackend {
        if self.db.is_some() {
            StorageBackend::Sqlite
        } else {
            StorageBackend::Memory
        }
    }

    /// SQLite round trip; the memory backend is always healthy.
    pub fn health_check(&self) -> Result<()> {
        self.db.as_ref().map_or(Ok(()), |db| db.health_check())
    }
}
