//! HTTP client for the upstream chat completions API.
//!
//! One [`UpstreamClient`] is built at startup and shared across all in-flight
//! calls; reqwest's internal connection pool is the only
//! concurrency-sensitive shared state and is safe for concurrent reuse.

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::logging::{log_debug, log_error};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// Shared client for the upstream OpenAI-compatible API.
#[derive(Debug)]
pub struct UpstreamClient {
    client: reqwest::Client,
    headers: HeaderMap,
    chat_url: String,
    timeout_seconds: u64,
}

impl UpstreamClient {
    /// Create a new upstream client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConfigurationError`] if the configuration is
    /// incomplete (missing API key) or the HTTP client cannot be built.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        config.validate()?;
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            RelayError::configuration_error("Upstream API key is required")
        })?;

        let headers = Self::build_auth_headers(api_key)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                RelayError::configuration_error(format!("Failed to build HTTP client: {e}"))
            })?;
        let chat_url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        log_debug!(
            chat_url = %chat_url,
            timeout_seconds = config.timeout_seconds,
            "Upstream client initialized"
        );

        Ok(Self {
            client,
            headers,
            chat_url,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Build authentication headers for the upstream API.
    pub fn build_auth_headers(api_key: &str) -> RelayResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                RelayError::configuration_error(format!("Invalid API key format: {e}"))
            })?,
        );

        Ok(headers)
    }

    /// Execute a non-streaming chat completion call.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Upstream`] for a non-success status, carrying the
    ///   upstream's raw error body.
    /// - [`RelayError::Timeout`] when the configured timeout expires.
    /// - [`RelayError::RequestFailed`] for other transport failures.
    /// - [`RelayError::ResponseParsingError`] when the reply body is not JSON.
    pub async fn chat(&self, body: &Value) -> RelayResult<Value> {
        let response = self
            .client
            .post(&self.chat_url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        self.parse_success_response(response).await
    }

    /// Open a streaming chat completion call and hand back the live response.
    ///
    /// The response is not read here; the caller relays its byte stream
    /// unmodified. Dropping the response cancels the outbound call.
    pub async fn chat_stream(&self, body: &Value) -> RelayResult<reqwest::Response> {
        self.client
            .post(&self.chat_url)
            .headers(self.headers.clone())
            .header(ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            RelayError::timeout(self.timeout_seconds)
        } else {
            log_error!(
                url = %self.chat_url,
                error = %e,
                "HTTP request to upstream failed"
            );
            RelayError::request_failed(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Turn a non-success upstream response into an error carrying its status
    /// and raw body.
    async fn error_from_response(response: reqwest::Response) -> RelayError {
        let status = response.status().as_u16();
        let detail = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        RelayError::upstream(status, detail)
    }

    async fn parse_success_response(&self, response: reqwest::Response) -> RelayResult<Value> {
        let raw_body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(e)
            } else {
                RelayError::response_parsing_error(format!("Failed to read response: {e}"))
            }
        })?;

        serde_json::from_str(&raw_body).map_err(|e| {
            log_error!(
                error = %e,
                raw_body = %raw_body,
                "Failed to parse upstream response"
            );
            RelayError::response_parsing_error(format!("Invalid response: {e}"))
        })
    }
}
