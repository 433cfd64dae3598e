//! The `ExecutableNode` trait, the contract every node must fulfil.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{NodeError, NodeItem, NodeOutput};

/// Shared context passed to every node during execution.
///
/// Defined here so both the host and individual node implementations can
/// import it without a circular dependency.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the parent workflow.
    pub workflow_id: uuid::Uuid,
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// Decrypted credential values for this node, keyed by field name.
    pub secrets: HashMap<String, String>,
    /// Record per-item failures instead of aborting the batch.
    pub continue_on_fail: bool,
}

impl ExecutionContext {
    /// Context for a single run with fresh IDs.
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self {
            workflow_id: uuid::Uuid::new_v4(),
            execution_id: uuid::Uuid::new_v4(),
            secrets,
            continue_on_fail: false,
        }
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// Secret value by name; `None` when absent.
    pub fn secret(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }
}

/// The core node trait.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node over the host's input items and return one output
    /// per item.
    async fn execute(
        &self,
        items: Vec<NodeItem>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<NodeOutput>, NodeError>;
}
