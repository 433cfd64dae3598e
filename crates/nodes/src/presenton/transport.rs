//! HTTP plumbing: the `Transport` seam and its `reqwest` implementation.
//!
//! Two request shapes exist: a JSON request (any method, body only on
//! POST/PUT) and a multipart upload carrying a single `files` field. Every
//! request is authenticated with the credential's bearer token, and every
//! response is passed back as raw JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, Url};
use serde_json::Value;
use tracing::debug;

use super::credentials::PresentonCredentials;
use crate::NodeError;

/// Multipart field name the upload endpoint reads files from.
pub const UPLOAD_FIELD: &str = "files";
pub const DEFAULT_FILE_NAME: &str = "file";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Request descriptions
// ---------------------------------------------------------------------------

/// A JSON request against the Presenton API.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRequest {
    pub method: Method,
    pub url: Url,
    /// Ignored unless `method` is POST or PUT.
    pub body: Option<Value>,
}

/// A file sent as the multipart `files` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl FilePart {
    /// Build a part, falling back to the default name and MIME type for
    /// missing or blank values.
    pub fn new(data: Vec<u8>, file_name: Option<&str>, mime_type: Option<&str>) -> Self {
        let non_blank = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
        Self {
            file_name: non_blank(file_name).unwrap_or_else(|| DEFAULT_FILE_NAME.to_owned()),
            mime_type: non_blank(mime_type).unwrap_or_else(|| DEFAULT_MIME_TYPE.to_owned()),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Sends requests to the Presenton API and returns the response JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_json(
        &self,
        credentials: &PresentonCredentials,
        request: JsonRequest,
    ) -> Result<Value, NodeError>;

    async fn send_form(
        &self,
        credentials: &PresentonCredentials,
        url: Url,
        file: FilePart,
    ) -> Result<Value, NodeError>;
}

// ---------------------------------------------------------------------------
// reqwest implementation
// ---------------------------------------------------------------------------

/// Tuning knobs for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Per-request timeout, covering connect through body read.
    pub timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("presenton-node/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NodeError::api(None, format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Assemble (but do not send) a JSON request.
    pub fn build_json_request(
        &self,
        credentials: &PresentonCredentials,
        request: JsonRequest,
    ) -> Result<reqwest::Request, NodeError> {
        let attach_body = request.method == Method::POST || request.method == Method::PUT;
        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(AUTHORIZATION, credentials.bearer())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let (true, Some(body)) = (attach_body, request.body.as_ref()) {
            builder = builder.json(body);
        }
        builder
            .build()
            .map_err(|e| NodeError::api(None, format!("failed to build request: {e}")))
    }

    /// Assemble (but do not send) a multipart upload.
    pub fn build_form_request(
        &self,
        credentials: &PresentonCredentials,
        url: Url,
        file: FilePart,
    ) -> Result<reqwest::Request, NodeError> {
        let part = Part::bytes(file.data)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)
            .map_err(|e| {
                NodeError::operation(format!("Invalid MIME type '{}': {e}", file.mime_type))
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        self.client
            .post(url)
            .header(AUTHORIZATION, credentials.bearer())
            .header(ACCEPT, "application/json")
            .multipart(form)
            .build()
            .map_err(|e| NodeError::api(None, format!("failed to build request: {e}")))
    }

    async fn dispatch(&self, request: reqwest::Request) -> Result<Value, NodeError> {
        debug!(method = %request.method(), url = %request.url(), "sending Presenton request");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| NodeError::api(e.status().map(|s| s.as_u16()), e.to_string()))?;
        read_response(response).await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_json(
        &self,
        credentials: &PresentonCredentials,
        request: JsonRequest,
    ) -> Result<Value, NodeError> {
        let request = self.build_json_request(credentials, request)?;
        self.dispatch(request).await
    }

    async fn send_form(
        &self,
        credentials: &PresentonCredentials,
        url: Url,
        file: FilePart,
    ) -> Result<Value, NodeError> {
        let request = self.build_form_request(credentials, url, file)?;
        self.dispatch(request).await
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

async fn read_response(response: Response) -> Result<Value, NodeError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| NodeError::api(Some(status.as_u16()), format!("failed to read body: {e}")))?;
    debug!(status = status.as_u16(), bytes = text.len(), "Presenton response received");

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("request failed");
        return Err(NodeError::api(
            Some(status.as_u16()),
            error_message(&text).unwrap_or_else(|| reason.to_owned()),
        ));
    }

    Ok(parse_body(&text))
}

/// Success bodies pass through as JSON; empty bodies become `null` and
/// non-JSON bodies a JSON string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Best human-readable message from an error body.
fn error_message(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let Ok(json) = serde_json::from_str::<Value>(text) else {
        return Some(text.to_owned());
    };
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| match json.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .or_else(|| Some(text.to_owned()))
}
