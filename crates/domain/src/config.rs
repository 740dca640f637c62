//! Configuration structures
//!
//! Every section has a `Default`, so a partial TOML/JSON file only needs to
//! mention what it overrides. Loading lives in `meetbook-infra`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_DB_PATH, DEFAULT_LOG_LEVEL, DEFAULT_MARKER_COLOR,
    DEFAULT_MAX_CAS_ATTEMPTS, DEFAULT_MAX_TRANSIENT_RETRIES, DEFAULT_POOL_SIZE,
    DEFAULT_RETRY_BASE_DELAY_MS,
};
use crate::errors::{MeetbookError, Result};
use crate::impl_domain_status_conversions;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub reservations: ReservationConfig,
    pub calendar: CalendarConfig,
    pub access: AccessConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values that would make the engine misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(MeetbookError::Config("database.pool_size must be at least 1".into()));
        }
        if self.database.storage_backend == StorageBackend::Sqlite
            && self.database.path.trim().is_empty()
        {
            return Err(MeetbookError::Config("database.path cannot be empty".into()));
        }
        if self.reservations.max_cas_attempts == 0 {
            return Err(MeetbookError::Config(
                "reservations.max_cas_attempts must be at least 1".into(),
            ));
        }
        if self.calendar.marker_color.trim().is_empty() {
            return Err(MeetbookError::Config("calendar.marker_color cannot be empty".into()));
        }
        Ok(())
    }
}

/// Which storage adapter backs the repositories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl_domain_status_conversions!(StorageBackend {
    Sqlite => "sqlite",
    Memory => "memory",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
    pub storage_backend: StorageBackend,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DB_PATH.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            storage_backend: StorageBackend::Sqlite,
        }
    }
}

/// Retry bounds for seat changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationConfig {
    /// Extra attempts after a transient backend failure (0 disables retry)
    pub max_transient_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Compare-and-swap rounds before a contended update gives up
    pub max_cas_attempts: u32,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            max_transient_retries: DEFAULT_MAX_TRANSIENT_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_cas_attempts: DEFAULT_MAX_CAS_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub marker_color: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { marker_color: DEFAULT_MARKER_COLOR.to_string() }
    }
}

/// Operator-controlled access bootstrap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Registered users with one of these emails are promoted to admin when
    /// the application context starts.
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `meetbook_core=debug`
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}
