//! Items exchanged between the host and a node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A file attached to an input item under a named binary property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    /// Raw file contents.
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// One input item as handed over by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeItem {
    /// Data produced by the previous step.
    #[serde(default)]
    pub json: Value,
    /// Node parameters already resolved by the host for this item.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Files keyed by binary property name.
    #[serde(default)]
    pub binary: HashMap<String, BinaryData>,
}

impl NodeItem {
    /// Item carrying only resolved parameters.
    pub fn with_parameters(parameters: Map<String, Value>) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    /// Attach a file under `property`.
    pub fn attach(mut self, property: impl Into<String>, data: BinaryData) -> Self {
        self.binary.insert(property.into(), data);
        self
    }
}

/// One result returned to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
    pub json: Value,
    /// Index of the input item this result belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<usize>,
}

impl NodeOutput {
    pub fn success(json: Value, item_index: usize) -> Self {
        Self {
            json,
            paired_item: Some(item_index),
        }
    }

    /// The `{"error": ...}` record emitted in place of a failed item.
    pub fn failure(message: impl Into<String>, item_index: usize) -> Self {
        Self {
            json: serde_json::json!({ "error": message.into() }),
            paired_item: Some(item_index),
        }
    }
}
