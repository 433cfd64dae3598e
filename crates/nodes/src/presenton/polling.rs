//! Repeated status checks until a generation job finishes.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use super::credentials::PresentonCredentials;
use super::node::PresentonNode;
use crate::NodeError;

/// Status values after which the job no longer changes.
pub const TERMINAL_STATUSES: [&str; 3] = ["completed", "error", "failed"];

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between two status checks.
    pub interval: Duration,
    /// Total number of status checks, including the first.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Last status response plus whether the job had finished.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub response: Value,
    pub attempts: u32,
    pub finished: bool,
}

/// `true` when the response's `status` field names a terminal state.
pub fn is_terminal(response: &Value) -> bool {
    response
        .get("status")
        .and_then(Value::as_str)
        .map(|s| TERMINAL_STATUSES.iter().any(|t| t.eq_ignore_ascii_case(s.trim())))
        .unwrap_or(false)
}

/// Check `task_id` until it reaches a terminal status or `max_attempts`
/// checks have been made.
///
/// # Errors
/// The first failing status check is returned as is.
pub async fn poll_status(
    node: &PresentonNode,
    credentials: &PresentonCredentials,
    task_id: &str,
    config: &PollConfig,
) -> Result<PollOutcome, NodeError> {
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        let response = node.check_status(credentials, task_id).await?;
        attempts += 1;

        if is_terminal(&response) {
            info!(task_id, attempts, "task reached a terminal status");
            return Ok(PollOutcome { response, attempts, finished: true });
        }
        if attempts >= max_attempts {
            return Ok(PollOutcome { response, attempts, finished: false });
        }

        debug!(
            "task '{}' not finished (attempt {}/{}), checking again in {:?}",
            task_id, attempts, max_attempts, config.interval
        );
        tokio::time::sleep(config.interval).await;
    }
}
