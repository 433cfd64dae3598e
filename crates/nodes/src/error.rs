//! Node-level error type.

use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// The host uses the variant to decide how to present the failure:
/// - `Operation`: the user's parameters or input were rejected before any
///   request was sent.
/// - `Api`: the remote service (or the transport to it) failed.
///
/// Both variants carry the index of the input item that triggered them once
/// they leave the per-item dispatcher.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    /// Validation failure raised by the node itself.
    #[error("{message}")]
    Operation {
        message: String,
        /// Longer, user-facing explanation.
        description: Option<String>,
        item_index: Option<usize>,
    },

    /// Remote API or transport failure.
    #[error("{}", api_message(.status, .message))]
    Api {
        /// HTTP status, absent for connection or decoding failures.
        status: Option<u16>,
        message: String,
        item_index: Option<usize>,
    },
}

fn api_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("remote API returned {code}: {message}"),
        None => format!("remote API request failed: {message}"),
    }
}

impl NodeError {
    /// A validation error without an item index.
    pub fn operation(message: impl Into<String>) -> Self {
        NodeError::Operation {
            message: message.into(),
            description: None,
            item_index: None,
        }
    }

    /// An API error without an item index.
    pub fn api(status: Option<u16>, message: impl Into<String>) -> Self {
        NodeError::Api {
            status,
            message: message.into(),
            item_index: None,
        }
    }

    /// Attach a user-facing description (only meaningful for `Operation`).
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        if let NodeError::Operation { description, .. } = &mut self {
            *description = Some(text.into());
        }
        self
    }

    /// Tag the error with the triggering item's index, keeping an index that
    /// was already set.
    pub fn with_item_index(mut self, index: usize) -> Self {
        match &mut self {
            NodeError::Operation { item_index, .. } | NodeError::Api { item_index, .. } => {
                item_index.get_or_insert(index);
            }
        }
        self
    }

    pub fn item_index(&self) -> Option<usize> {
        match self {
            NodeError::Operation { item_index, .. } | NodeError::Api { item_index, .. } => {
                *item_index
            }
        }
    }

    /// `true` for failures the user fixes by changing parameters or input.
    pub fn is_validation(&self) -> bool {
        matches!(self, NodeError::Operation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_index_is_set_once() {
        let err = NodeError::operation("bad").with_item_index(2).with_item_index(7);
        assert_eq!(err.item_index(), Some(2));
    }

    #[test]
    fn api_error_display_includes_status() {
        let err = NodeError::api(Some(401), "invalid token");
        assert_eq!(err.to_string(), "remote API returned 401: invalid token");

        let err = NodeError::api(None, "connection refused");
        assert_eq!(err.to_string(), "remote API request failed: connection refused");
    }

    #[test]
    fn description_only_applies_to_operation_errors() {
        let err = NodeError::operation("Invalid number of slides")
            .with_description("No of Slides must be a positive number.");
        assert!(matches!(
            err,
            NodeError::Operation { description: Some(ref d), .. } if d.contains("positive")
        ));

        let err = NodeError::api(Some(500), "boom").with_description("ignored");
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "remote API returned 500: boom");
    }
}
