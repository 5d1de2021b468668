//! Error types for relay operations.
//!
//! This module provides structured error handling for schema-relay,
//! including categorization and HTTP status mapping for caller-surfaced
//! failures.
//!
//! Deliberately *not* errors: extraction failures, absent assistant content,
//! and an absent `response_format` are all normal outcomes handled with
//! `Option` in the pipeline modules.

use crate::logging::{log_error, log_warn};
use thiserror::Error;

/// High-level categorization of errors for routing and handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller made a mistake they can fix (malformed request fields).
    Client,

    /// The upstream API or the network path to it had an issue.
    External,

    /// Internal system errors (bad configuration, invariant violations).
    Internal,
}

/// Convenient result type for relay operations.
pub type RelayResult<T> = std::result::Result<T, RelayError>;

/// Errors that can occur while relaying a chat completion call.
///
/// Each variant can be categorized via [`category()`](Self::category) and
/// mapped to an HTTP status for the caller via
/// [`status_code()`](Self::status_code).
///
/// # Creating errors
///
/// Use the constructor methods, which log automatically at the appropriate
/// level:
///
/// ```rust
/// use schema_relay::RelayError;
///
/// let err = RelayError::configuration_error("Missing upstream API key");
/// let err = RelayError::invalid_request("malformed response_format");
/// let err = RelayError::timeout(90);
/// ```
#[derive(Error, Debug)]
pub enum RelayError {
    /// Relay configuration is invalid or incomplete.
    ///
    /// Raised at startup; a missing upstream credential refuses to start the
    /// process rather than failing per request.
    #[error("Relay configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The caller's request body is malformed.
    ///
    /// Covers a `response_format` of type `json_schema` without a schema
    /// value, and a structured-output request without a `messages` array.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// The upstream API answered with a non-success status.
    ///
    /// On the non-streaming path this is propagated to the caller with the
    /// same status code and the upstream's raw error body as detail.
    #[error("Upstream returned status {status}: {detail}")]
    Upstream {
        /// The upstream HTTP status code.
        status: u16,
        /// The upstream's raw error body.
        detail: String,
    },

    /// The HTTP request to the upstream API failed in transport.
    #[error("Upstream request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream API did not respond within the configured timeout.
    #[error("Upstream request timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout_seconds: u64,
    },

    /// The upstream reply could not be interpreted.
    ///
    /// The upstream answered 2xx but the body was not valid JSON or did not
    /// carry a non-empty `choices` array.
    #[error("Upstream response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },
}

impl RelayError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } => ErrorCategory::Internal,
            Self::InvalidRequest { .. } => ErrorCategory::Client,
            Self::Upstream { .. } => ErrorCategory::External,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::Timeout { .. } => ErrorCategory::External,
            Self::ResponseParsingError { .. } => ErrorCategory::External,
        }
    }

    /// HTTP status code surfaced to the caller for this error.
    ///
    /// Upstream non-success statuses pass through unchanged; timeouts map to
    /// 504; other upstream failures map to 502.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ConfigurationError { .. } => 500,
            Self::InvalidRequest { .. } => 400,
            Self::Upstream { status, .. } => *status,
            Self::RequestFailed { .. } => 502,
            Self::Timeout { .. } => 504,
            Self::ResponseParsingError { .. } => 502,
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Relay configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "invalid_request",
            message = %message,
            "Rejecting malformed chat completion request"
        );
        Self::InvalidRequest { message }
    }

    pub fn upstream(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        log_warn!(
            error_type = "upstream_error",
            status = status,
            detail = %detail,
            "Upstream API returned an error status"
        );
        Self::Upstream { status, detail }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Upstream request execution failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Upstream request timed out"
        );
        Self::Timeout { timeout_seconds }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Upstream response format invalid"
        );
        Self::ResponseParsingError { message }
    }
}
