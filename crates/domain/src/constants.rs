//! Application constants
//!
//! Centralized location for domain-level limits and defaults.

// Field limits
pub const MAX_MEETING_NAME_LENGTH: usize = 120;
pub const MAX_PERSON_NAME_LENGTH: usize = 80;
pub const MAX_EMAIL_LENGTH: usize = 254;

// Calendar
pub const DEFAULT_MARKER_COLOR: &str = "blue";

// Storage defaults
pub const DEFAULT_DB_PATH: &str = "meetbook.db";
pub const DEFAULT_POOL_SIZE: u32 = 8;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// Reservation retry defaults
pub const DEFAULT_MAX_TRANSIENT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 25;
pub const DEFAULT_MAX_CAS_ATTEMPTS: u32 = 16;

// Sessions
pub const SESSION_TOKEN_BYTES: usize = 32;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
