//! Outbound HTTP for linkmark.
//!
//! Page fetches and the summarization call go through [`HttpClientTrait`] so
//! the metadata extractor and summarizer can be built against a test double.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::types::errors::FetchError;

/// Capability to perform the two kinds of outbound requests the pipeline needs.
#[async_trait]
pub trait HttpClientTrait: Send + Sync {
    /// GETs `url` and returns the body as text. Non-2xx is an error.
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;

    /// POSTs `body` as JSON and decodes the JSON response. Non-2xx is an error.
    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, FetchError>;
}

/// `reqwest`-backed client. Holds one connection pool; cheap to share in an `Arc`.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Builds a client that sends `user_agent` on every request.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn map_send_error(e: reqwest::Error, timeout: Duration) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(timeout.as_secs())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl HttpClientTrait for ReqwestHttpClient {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        debug!(url, timeout_secs = timeout.as_secs(), "fetching page");
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout.as_secs())
            } else {
                FetchError::Decode(e.to_string())
            }
        })
    }

    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, FetchError> {
        let mut request = self.client.post(url).timeout(timeout).json(body);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout.as_secs())
            } else {
                FetchError::Decode(e.to_string())
            }
        })
    }
}
