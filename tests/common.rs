//! Shared helpers for relay integration tests.

use schema_relay::{build_app, RelayConfig, UpstreamClient};

pub fn test_config(base_url: String) -> RelayConfig {
    RelayConfig {
        api_key: Some("test-key".to_string()),
        base_url,
        timeout_seconds: 5,
        listen_addr: "127.0.0.1:0".to_string(),
    }
}

pub fn test_app(base_url: String) -> axum::Router {
    let client =
        UpstreamClient::new(test_config(base_url)).expect("test client should initialize");
    build_app(client)
}
