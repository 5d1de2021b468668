//! # schema-relay
//!
//! OpenAI-compatible relay that adds structured output support to upstream
//! chat completion APIs that do not understand the `response_format` field.
//!
//! ## How it works
//!
//! - **Request side**: a caller-supplied `response_format` is translated into
//!   a system message instructing the model to reply with pure JSON
//!   (optionally naming a schema), and the field is stripped before the
//!   request is forwarded upstream.
//! - **Response side** (non-streaming): the first choice's text is scanned
//!   for a JSON object and the result is attached under
//!   `choices[0].message.additional_kwargs` as `parsed`/`refusal`, without
//!   touching any existing field.
//! - **Streaming**: upstream bytes are relayed to the caller unmodified.
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_relay::{build_app, RelayConfig, UpstreamClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RelayConfig {
//!     api_key: Some("your-api-key".to_string()),
//!     ..RelayConfig::default()
//! };
//! config.validate()?;
//!
//! let app = build_app(UpstreamClient::new(config)?);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod client;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod response_parser;
pub mod server;
pub mod transform;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use client::UpstreamClient;
pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use server::build_app;
pub use transform::ResponseFormat;
