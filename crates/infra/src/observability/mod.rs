//! Tracing subscriber setup
//!
//! One registry per process: an [`EnvFilter`] built from `RUST_LOG` when set,
//! otherwise from [`LoggingConfig::level`], feeding either the human `fmt`
//! layer or its JSON variant.

use meetbook_domain::{LoggingConfig, MeetbookError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// # Errors
/// `Config` for an unparsable filter directive, `Internal` if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let directive = resolve_directive(config, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| MeetbookError::Config(format!("invalid log filter '{directive}': {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|e| MeetbookError::Internal(format!("tracing already initialised: {e}")))?;
    tracing::debug!(filter = %directive, json = config.json, "tracing initialised");
    Ok(())
}

/// `RUST_LOG` wins over the configured level when it is non-blank.
fn resolve_directive(config: &LoggingConfig, rust_log: Option<String>) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logging(level: &str) -> LoggingConfig {
        LoggingConfig { level: level.into(), json: false }
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        let directive = resolve_directive(&logging("info"), Some("meetbook_core=debug".into()));
        assert_eq!(directive, "meetbook_core=debug");
    }

    #[test]
    fn blank_rust_log_falls_back_to_config() {
        assert_eq!(resolve_directive(&logging("warn"), Some("  ".into())), "warn");
        assert_eq!(resolve_directive(&logging("warn"), None), "warn");
    }

    #[test]
    fn configured_levels_parse_as_filters() {
        for level in ["info", "debug", "meetbook_core=trace,warn"] {
            assert!(EnvFilter::try_new(level).is_ok(), "{level} should parse");
        }
    }
}
