//! `PresentonNode`: dispatches each input item to one Presenton API call.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::credentials::PresentonCredentials;
use super::operation::{
    Operation, GENERATE_ASYNC_PATH, OPERATION_PARAM, PROFILE_PATH, STATUS_PATH, UPLOAD_PATH,
};
use super::request::{binary_property, task_id, GenerateRequest};
use super::transport::{FilePart, HttpTransport, HttpTransportConfig, JsonRequest, Transport};
use crate::{ExecutableNode, ExecutionContext, NodeError, NodeItem, NodeOutput};

/// Workflow node for the Presenton presentation-generation API.
///
/// Stateless: every call builds its request from the arguments alone, so one
/// node can serve any number of executions.
#[derive(Clone)]
pub struct PresentonNode {
    transport: Arc<dyn Transport>,
}

impl PresentonNode {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Node talking to the real API over HTTP.
    pub fn http(config: HttpTransportConfig) -> Result<Self, NodeError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Submit an asynchronous generation job.
    pub async fn generate(
        &self,
        credentials: &PresentonCredentials,
        request: &GenerateRequest,
    ) -> Result<Value, NodeError> {
        let body = request.to_body()?;
        self.transport
            .send_json(
                credentials,
                JsonRequest {
                    method: Method::POST,
                    url: credentials.endpoint(GENERATE_ASYNC_PATH)?,
                    body: Some(body),
                },
            )
            .await
    }

    /// Single status check for `task_id`.
    pub async fn check_status(
        &self,
        credentials: &PresentonCredentials,
        task_id: &str,
    ) -> Result<Value, NodeError> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return Err(NodeError::operation("Task ID is required"));
        }

        let mut url = credentials.endpoint(STATUS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| NodeError::operation("Base URL cannot carry a path"))?
            .push(task_id);

        self.transport
            .send_json(
                credentials,
                JsonRequest {
                    method: Method::GET,
                    url,
                    body: None,
                },
            )
            .await
    }

    /// Upload a file for later reference by ID.
    pub async fn upload(
        &self,
        credentials: &PresentonCredentials,
        file: FilePart,
    ) -> Result<Value, NodeError> {
        let url = credentials.endpoint(UPLOAD_PATH)?;
        self.transport.send_form(credentials, url, file).await
    }

    /// Fetch the account profile; succeeds only for a valid API key.
    pub async fn verify_credentials(
        &self,
        credentials: &PresentonCredentials,
    ) -> Result<Value, NodeError> {
        self.transport
            .send_json(
                credentials,
                JsonRequest {
                    method: Method::GET,
                    url: credentials.endpoint(PROFILE_PATH)?,
                    body: None,
                },
            )
            .await
    }

    async fn execute_item(
        &self,
        credentials: &PresentonCredentials,
        item: &NodeItem,
        index: usize,
    ) -> Result<Value, NodeError> {
        let operation = match item.parameters.get(OPERATION_PARAM) {
            None | Some(Value::Null) => Operation::default(),
            Some(Value::String(name)) => name.parse()?,
            Some(other) => {
                return Err(NodeError::operation(format!(
                    "The operation {other} is not supported"
                )))
            }
        };
        info!(item = index, %operation, "executing Presenton operation");

        match operation {
            Operation::GenerateAsync => {
                let request = GenerateRequest::from_parameters(&item.parameters)?;
                self.generate(credentials, &request).await
            }
            Operation::CheckStatus => {
                let task_id = task_id(&item.parameters)?;
                self.check_status(credentials, &task_id).await
            }
            Operation::UploadFile => {
                let property = binary_property(&item.parameters)?;
                let binary = item.binary.get(&property).ok_or_else(|| {
                    NodeError::operation(format!(
                        "No binary data property '{property}' exists on item index {index}"
                    ))
                })?;
                let file = FilePart::new(
                    binary.data.clone(),
                    binary.file_name.as_deref(),
                    binary.mime_type.as_deref(),
                );
                self.upload(credentials, file).await
            }
        }
    }
}

#[async_trait]
impl ExecutableNode for PresentonNode {
    /// Items run one at a time, in order. With `continue_on_fail` a failing
    /// item yields `{"error": ...}` and the batch goes on; otherwise the first
    /// failure is returned, tagged with its item index.
    #[instrument(skip(self, items, ctx), fields(execution_id = %ctx.execution_id, items = items.len()))]
    async fn execute(
        &self,
        items: Vec<NodeItem>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<NodeOutput>, NodeError> {
        let credentials = PresentonCredentials::from_secrets(&ctx.secrets);
        let mut outputs = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let result = match &credentials {
                Ok(creds) => self.execute_item(creds, item, index).await,
                Err(e) => Err(e.clone()),
            };

            match result {
                Ok(json) => outputs.push(NodeOutput::success(json, index)),
                Err(err) => {
                    let err = err.with_item_index(index);
                    if ctx.continue_on_fail {
                        warn!(item = index, "item failed, continuing: {}", err);
                        outputs.push(NodeOutput::failure(err.to_string(), index));
                        continue;
                    }
                    error!(item = index, "item failed: {}", err);
                    return Err(err);
                }
            }
        }

        info!("processed {} item(s)", outputs.len());
        Ok(outputs)
    }
}
