//! Command execution helpers
//!
//! Every command runs through [`execute_command`] so timing and outcome
//! logging stay uniform.

use std::future::Future;
use std::time::Instant;

use meetbook_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Execute a command, logging its duration and outcome.
pub async fn execute_command<Fut, T>(command_name: &str, command: Fut) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command.await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
