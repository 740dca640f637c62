//! Structured logging for command outcomes

use std::time::Duration;

use meetbook_domain::MeetbookError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a stable identifier such as `"meetings::create_meeting"`;
/// it must never carry user input.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&MeetbookError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) if err.is_user_facing() => {
            info!(command, duration_ms, error_type = error_label(err), "command_execution_failure");
        }
        Some(err) => {
            warn!(
                command,
                duration_ms,
                error_type = error_label(err),
                error = %err,
                "command_execution_failure"
            );
        }
    }
}

/// Convert a `MeetbookError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &MeetbookError) -> &'static str {
    error.label()
}
