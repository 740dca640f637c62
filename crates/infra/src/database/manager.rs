//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use meetbook_domain::{DatabaseConfig, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};
use tracing::info;

use crate::errors::{map_storage_error, StorageError};

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

pub type SqlitePool = Pool<SqliteConnectionManager>;
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Database manager that wraps a [`SqlitePool`].
pub struct DbManager {
    pool: SqlitePool,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size and busy timeout.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();

        let manager = SqliteConnectionManager::file(&path)
            .with_init(move |conn| apply_connection_pragmas(conn, busy_timeout));

        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(busy_timeout.max(Duration::from_secs(1)))
            .build(manager)
            .map_err(|err| map_storage_error(StorageError::Connection(err.to_string())))?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            busy_timeout = ?busy_timeout,
            "sqlite pool initialised"
        );

        Ok(Self { pool, path })
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(&config.path, config.pool_size, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get().map_err(|err| map_storage_error(err.into()))
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn).map_err(map_storage_error)?;
        info!(schema_version = SCHEMA_VERSION, "database schema ready");
        Ok(())
    }

    /// Highest applied schema version, `None` before the first migration.
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let conn = self.get_connection()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
                params![],
                |row| row.get(0),
            )
            .map_err(|err| map_storage_error(err.into()))?;
        if !exists {
            return Ok(None);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", params![], |row| row.get(0))
            .map_err(|err| map_storage_error(err.into()))
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the database is reachable and answering queries.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(|err| map_storage_error(err.into()))?;
        Ok(())
    }
}

/// Per-connection pragmas: WAL, relaxed sync, enforced foreign keys.
fn apply_connection_pragmas(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;\n\
         PRAGMA synchronous=NORMAL;\n\
         PRAGMA foreign_keys=ON;",
    )?;
    conn.busy_timeout(busy_timeout)
}

fn create_schema(conn: &Connection) -> std::result::Result<(), StorageError> {
    conn.execute_batch(SCHEMA_SQL).map_err(|err| StorageError::Migration(err.to_string()))?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}
