//! HTTP client for the complaints API
//!
//! Wraps a base URL and a fixed request timeout. Every request runs under a
//! [`CancelToken`]; there are no retries, failures surface to the caller
//! immediately.

use futures::future::Aborted;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::cancel::CancelToken;

/// Default request timeout of the complaints API client
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ошибки обращения к API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response received (connection refused, DNS, reset...)
    #[error("Request failed: {0}")]
    Network(String),

    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The request was superseded. Never shown to the user.
    #[error("Request cancelled")]
    Cancelled,
}

impl From<Aborted> for ApiError {
    fn from(_: Aborted) -> Self {
        ApiError::Cancelled
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build a full API URL from a path
    ///
    /// # Example
    /// ```ignore
    /// let url = client.api_url("/stats/resolution");
    /// ```
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` with `query` and return the parsed JSON body
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        cancel: &CancelToken,
    ) -> Result<Value, ApiError> {
        cancel.run(self.send(path, query)).await?
    }

    /// GET `path` and deserialize the body into `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        cancel: &CancelToken,
    ) -> Result<T, ApiError> {
        let body = self.get_json(path, query, cancel).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.api_url(path);
        tracing::info!("API request: GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        tracing::info!("API response: {} for {}", status, url);

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("API response from {} is not valid JSON: {}", url, e);
            ApiError::Decode(e.to_string())
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            tracing::error!("API request to {} timed out after {:?}", url, self.timeout);
            ApiError::Timeout(self.timeout)
        } else {
            tracing::error!("API request to {} failed: {}", url, err);
            ApiError::Network(err.to_string())
        }
    }
}
