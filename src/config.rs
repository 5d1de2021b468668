//! Relay configuration.
//!
//! All values are read once at process start; environment access happens only
//! in [`RelayConfig::from_env`].

use crate::error::{RelayError, RelayResult};
use crate::logging::log_debug;
use serde::{Deserialize, Serialize};

/// Default upstream endpoint (Groq's OpenAI-compatible API).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default per-call upstream timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 90;

/// Relay-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Credential forwarded to the upstream API as a bearer token. Required.
    pub api_key: Option<String>,
    /// Base URL of the upstream OpenAI-compatible API.
    pub base_url: String,
    /// Timeout bounding each upstream call, in seconds.
    pub timeout_seconds: u64,
    /// Address the relay's HTTP server binds to.
    pub listen_addr: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            listen_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables:
    /// - `UPSTREAM_API_KEY` - upstream credential (required by [`validate`](Self::validate))
    /// - `UPSTREAM_BASE_URL` - upstream base URL
    /// - `UPSTREAM_TIMEOUT_SECONDS` - per-call timeout
    /// - `RELAY_LISTEN_ADDR` - bind address for the inbound server
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("UPSTREAM_API_KEY") {
            config.api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("UPSTREAM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("UPSTREAM_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.timeout_seconds = seconds;
            }
        }
        if let Ok(listen_addr) = std::env::var("RELAY_LISTEN_ADDR") {
            config.listen_addr = listen_addr;
        }

        log_debug!(
            base_url = %config.base_url,
            timeout_seconds = config.timeout_seconds,
            has_api_key = config.api_key.is_some(),
            listen_addr = %config.listen_addr,
            "Relay configuration loaded from environment"
        );

        config
    }

    /// Validate the configuration is complete.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConfigurationError`] if the upstream API key is
    /// missing or the base URL is empty. Callers must refuse to start in that
    /// case rather than fail per request.
    pub fn validate(&self) -> RelayResult<()> {
        if self.api_key.is_none() {
            return Err(RelayError::configuration_error(
                "Upstream API key is required (set UPSTREAM_API_KEY)",
            ));
        }
        if self.base_url.is_empty() {
            return Err(RelayError::configuration_error(
                "Upstream base URL must not be empty",
            ));
        }
        Ok(())
    }
}
