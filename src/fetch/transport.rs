//! HTTP transport used by every metric fetcher.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Header the node API reads the credential from
pub const API_KEY_HEADER: &str = "api_key";

/// Errors a single status request can end with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("timeout")]
    Timeout,

    #[error("{0}")]
    Network(String),

    #[error("HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("invalid response body: {0}")]
    Body(String),
}

/// Issues one JSON GET request to a node
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, api_key: &str) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_decode() {
        TransportError::Body(error.to_string())
    } else {
        TransportError::Network(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, api_key: &str) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        response.json::<Value>().await.map_err(classify_reqwest_error)
    }
}
