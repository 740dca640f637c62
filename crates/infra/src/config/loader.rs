//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `MEETBOOK_DB_PATH` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Whatever the source, the result is checked with [`Config::validate`].
//!
//! ## Environment Variables
//! - `MEETBOOK_DB_PATH`: Database file path (required for the env source)
//! - `MEETBOOK_DB_POOL_SIZE`: Connection pool size
//! - `MEETBOOK_DB_BUSY_TIMEOUT_MS`: SQLite busy timeout in milliseconds
//! - `MEETBOOK_STORAGE_BACKEND`: `sqlite` or `memory`
//! - `MEETBOOK_MAX_TRANSIENT_RETRIES`: Extra attempts after transient failures
//! - `MEETBOOK_RETRY_BASE_DELAY_MS`: First retry backoff in milliseconds
//! - `MEETBOOK_MAX_CAS_ATTEMPTS`: Compare-and-swap rounds per seat change
//! - `MEETBOOK_MARKER_COLOR`: Calendar dot color
//! - `MEETBOOK_ADMIN_EMAILS`: Comma-separated emails promoted at startup
//! - `MEETBOOK_LOG_LEVEL`: Log filter directive
//! - `MEETBOOK_LOG_JSON`: Emit JSON logs (true/false)
//!
//! Optional variables that are unset keep their [`Default`] values.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./meetbook.toml` or `./meetbook.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use meetbook_domain::{Config, MeetbookError, Result, StorageBackend};

/// Load configuration with automatic fallback strategy
///
/// Environment first, then the first probed config file, then defaults.
///
/// # Errors
/// Returns `MeetbookError::Config` if a source is present but invalid.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            return Ok(config);
        }
        Err(e) => {
            tracing::debug!(error = %e, "Environment configuration unavailable, trying file");
        }
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration source found, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// `MEETBOOK_DB_PATH` must be present; every other variable is optional.
///
/// # Errors
/// Returns `MeetbookError::Config` if the path is missing or a value does
/// not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("MEETBOOK_DB_PATH")?;
    if let Some(pool_size) = env_parse::<u32>("MEETBOOK_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    if let Some(timeout) = env_parse::<u64>("MEETBOOK_DB_BUSY_TIMEOUT_MS")? {
        config.database.busy_timeout_ms = timeout;
    }
    if let Some(backend) = env_parse::<StorageBackend>("MEETBOOK_STORAGE_BACKEND")? {
        config.database.storage_backend = backend;
    }

    if let Some(retries) = env_parse::<u32>("MEETBOOK_MAX_TRANSIENT_RETRIES")? {
        config.reservations.max_transient_retries = retries;
    }
    if let Some(delay) = env_parse::<u64>("MEETBOOK_RETRY_BASE_DELAY_MS")? {
        config.reservations.retry_base_delay_ms = delay;
    }
    if let Some(attempts) = env_parse::<u32>("MEETBOOK_MAX_CAS_ATTEMPTS")? {
        config.reservations.max_cas_attempts = attempts;
    }

    if let Ok(color) = std::env::var("MEETBOOK_MARKER_COLOR") {
        config.calendar.marker_color = color;
    }
    if let Ok(emails) = std::env::var("MEETBOOK_ADMIN_EMAILS") {
        config.access.admin_emails = split_list(&emails);
    }

    if let Ok(level) = std::env::var("MEETBOOK_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("MEETBOOK_LOG_JSON", config.logging.json);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `MeetbookError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MeetbookError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MeetbookError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MeetbookError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MeetbookError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MeetbookError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MeetbookError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.toml", "config.json", "meetbook.toml", "meetbook.json"];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
        candidates.extend(NAMES.iter().map(|name| cwd.join("..").join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        MeetbookError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable; unset yields `None`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| MeetbookError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty()).map(String::from).collect()
}
