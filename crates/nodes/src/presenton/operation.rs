//! The user-selectable operations and the endpoints they call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::NodeError;

pub const GENERATE_ASYNC_PATH: &str = "/api/v1/ppt/presentation/generate/async";
/// The task ID is appended as one extra path segment.
pub const STATUS_PATH: &str = "/api/v1/ppt/presentation/status";
pub const UPLOAD_PATH: &str = "/api/v1/ppt/files/upload";
/// Credential check endpoint.
pub const PROFILE_PATH: &str = "/api/v1/auth/profile";

/// Parameter holding the operation name.
pub const OPERATION_PARAM: &str = "operation";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Start generating a presentation; answers with a task ID.
    #[default]
    GenerateAsync,
    /// Single status check for a task ID.
    CheckStatus,
    /// Upload a file to reference from a later generation.
    UploadFile,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::GenerateAsync,
        Operation::CheckStatus,
        Operation::UploadFile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GenerateAsync => "generateAsync",
            Operation::CheckStatus => "checkStatus",
            Operation::UploadFile => "uploadFile",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| {
                NodeError::operation(format!("The operation '{s}' is not supported"))
                    .with_description("Use one of generateAsync, checkStatus or uploadFile.")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
            assert_eq!(serde_json::to_value(op).unwrap(), op.as_str());
        }
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = "deletePresentation".parse::<Operation>().unwrap_err();
        assert!(err.is_validation());
    }
}
