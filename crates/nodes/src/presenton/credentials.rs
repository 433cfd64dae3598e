//! Presenton API credentials.

use std::collections::HashMap;
use std::fmt;

use reqwest::Url;

use crate::NodeError;

/// Base URL used when the credential leaves it unset.
pub const DEFAULT_BASE_URL: &str = "https://api.presenton.ai";

/// Secret key holding the API key.
pub const API_KEY_FIELD: &str = "apiKey";
/// Secret key holding the optional base URL override.
pub const BASE_URL_FIELD: &str = "baseUrl";

/// API key plus the base URL every request is resolved against.
#[derive(Clone, PartialEq, Eq)]
pub struct PresentonCredentials {
    api_key: String,
    base_url: String,
}

impl PresentonCredentials {
    /// # Errors
    /// Returns [`NodeError::Operation`] when the API key is blank.
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Result<Self, NodeError> {
        let api_key = api_key.into().trim().to_owned();
        if api_key.is_empty() {
            return Err(NodeError::operation("Presenton API key is missing")
                .with_description("Set the 'API Key' field of the Presenton credential."));
        }

        let base_url = match base_url.map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_owned(),
            _ => DEFAULT_BASE_URL.to_owned(),
        };
        match Url::parse(&base_url) {
            Err(e) => {
                return Err(NodeError::operation(format!("Invalid base URL '{base_url}': {e}"))
                    .with_description("Set 'Base API URL' to an absolute http(s) URL."));
            }
            Ok(url) if url.query().is_some() || url.fragment().is_some() => {
                return Err(NodeError::operation(format!(
                    "Invalid base URL '{base_url}': query strings and fragments are not allowed"
                ))
                .with_description("Endpoint paths are appended to 'Base API URL'."));
            }
            Ok(_) => {}
        }

        Ok(Self { api_key, base_url })
    }

    /// Read the credential from the execution context secrets.
    pub fn from_secrets(secrets: &HashMap<String, String>) -> Result<Self, NodeError> {
        let api_key = secrets.get(API_KEY_FIELD).cloned().unwrap_or_default();
        Self::new(api_key, secrets.get(BASE_URL_FIELD).map(String::as_str))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path starting with `/`.
    pub fn endpoint(&self, path: &str) -> Result<Url, NodeError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| NodeError::operation(format!("Invalid endpoint URL: {e}")))
    }

    /// Value of the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl fmt::Debug for PresentonCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentonCredentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_base_url_is_used_when_unset_or_blank() {
        let creds = PresentonCredentials::from_secrets(&secrets(&[("apiKey", "sk-1")])).unwrap();
        assert_eq!(creds.base_url(), DEFAULT_BASE_URL);

        let creds = PresentonCredentials::from_secrets(&secrets(&[
            ("apiKey", "sk-1"),
            ("baseUrl", "  "),
        ]))
        .unwrap();
        assert_eq!(creds.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let creds = PresentonCredentials::new("sk-1", Some("https://staging.presenton.ai/")).unwrap();
        assert_eq!(
            creds.endpoint("/api/v1/ppt/files/upload").unwrap().as_str(),
            "https://staging.presenton.ai/api/v1/ppt/files/upload"
        );
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let err = PresentonCredentials::new("sk-1", Some("presenton.local")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn base_url_with_query_or_fragment_is_rejected() {
        for url in ["https://h.test/?x=1", "https://h.test/api#top", "https://h.test?"] {
            let err = PresentonCredentials::new("sk-1", Some(url)).unwrap_err();
            assert!(err.is_validation(), "{url} should be rejected");
        }
        let creds = PresentonCredentials::new("sk-1", Some("https://h.test/prefix")).unwrap();
        assert_eq!(
            creds.endpoint("/api/v1/ppt/files/upload").unwrap().path(),
            "/prefix/api/v1/ppt/files/upload"
        );
    }

    #[test]
    fn missing_api_key_is_a_validation_error() {
        let err = PresentonCredentials::from_secrets(&HashMap::new()).unwrap_err();
        assert!(err.is_validation());

        let err = PresentonCredentials::new("   ", None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let creds = PresentonCredentials::new("sk-secret", None).unwrap();
        let printed = format!("{creds:?}");
        assert!(!printed.contains("sk-secret"));
        assert_eq!(creds.bearer(), "Bearer sk-secret");
    }
}
