//! `MockTransport`: a test double for `Transport`.
//!
//! Records every request it receives and answers with a programmer-specified
//! result, so the node can be exercised without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::credentials::PresentonCredentials;
use super::transport::{FilePart, JsonRequest, Transport};
use crate::NodeError;

/// Behaviour injected into `MockTransport` at construction time.
pub enum MockBehaviour {
    /// Return a specific JSON value.
    ReturnValue(Value),
    /// Fail as the remote API would with the given status.
    FailApi { status: u16, message: String },
}

/// One request seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Json {
        method: String,
        url: String,
        authorization: String,
        body: Option<Value>,
    },
    Form {
        url: String,
        authorization: String,
        file: FilePart,
    },
}

impl RecordedCall {
    pub fn url(&self) -> &str {
        match self {
            RecordedCall::Json { url, .. } | RecordedCall::Form { url, .. } => url,
        }
    }
}

pub struct MockTransport {
    /// What the transport does once `queued` responses run out.
    pub behaviour: MockBehaviour,
    queued: Mutex<VecDeque<Value>>,
    /// All requests seen by this transport (in call order).
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    /// Create a mock that always succeeds with the given value.
    pub fn returning(value: Value) -> Self {
        Self::with_behaviour(MockBehaviour::ReturnValue(value))
    }

    /// Create a mock that always fails with an API error.
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self::with_behaviour(MockBehaviour::FailApi {
            status,
            message: message.into(),
        })
    }

    /// Answer with `responses` in order before falling back to the
    /// behaviour.
    pub fn queue(self, responses: impl IntoIterator<Item = Value>) -> Self {
        self.queued.lock().unwrap().extend(responses);
        self
    }

    fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            queued: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of requests this transport has received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of the recorded requests.
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, call: RecordedCall) -> Result<Value, NodeError> {
        self.calls.lock().unwrap().push(call);
        if let Some(next) = self.queued.lock().unwrap().pop_front() {
            return Ok(next);
        }
        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::FailApi { status, message } => {
                Err(NodeError::api(Some(*status), message.clone()))
            }
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_json(
        &self,
        credentials: &PresentonCredentials,
        request: JsonRequest,
    ) -> Result<Value, NodeError> {
        self.respond(RecordedCall::Json {
            method: request.method.to_string(),
            url: request.url.to_string(),
            authorization: credentials.bearer(),
            body: request.body,
        })
    }

    async fn send_form(
        &self,
        credentials: &PresentonCredentials,
        url: Url,
        file: FilePart,
    ) -> Result<Value, NodeError> {
        self.respond(RecordedCall::Form {
            url: url.to_string(),
            authorization: credentials.bearer(),
            file,
        })
    }
}
