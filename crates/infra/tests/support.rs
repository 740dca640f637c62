//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use meetbook_domain::{Meeting, Role, User, UserId};
use meetbook_infra::database::{
    DbManager, SqliteMeetingRepository, SqliteSessionRepository, SqliteUserRepository,
};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Migrated database in a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_pool_size(4)
    }

    pub fn with_pool_size(pool_size: u32) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("meetbook-test.db");

        let manager = DbManager::new(&db_path, pool_size, Duration::from_secs(5))
            .expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn meetings(&self) -> SqliteMeetingRepository {
        SqliteMeetingRepository::new(Arc::clone(&self.manager))
    }

    pub fn users(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(Arc::clone(&self.manager))
    }

    pub fn sessions(&self) -> SqliteSessionRepository {
        SqliteSessionRepository::new(Arc::clone(&self.manager))
    }

    /// Run a scalar query, for checks below the repository API.
    pub fn count(&self, sql: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(sql, [], |row| row.get(0)).expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single().expect("valid instant")
}

pub fn meeting(name: &str, scheduled_at: DateTime<Utc>, capacity: u32) -> Meeting {
    Meeting::scheduled(name.to_string(), scheduled_at, capacity, at(2024, 3, 1, 12, 0))
}

pub fn user(id: &str, email: &str) -> User {
    User {
        id: UserId::new(id),
        email: email.to_string(),
        name: "Test".to_string(),
        surname: "User".to_string(),
        role: Role::User,
        created_at: at(2024, 3, 1, 12, 0),
    }
}
