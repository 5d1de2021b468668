use anyhow::Context;
use schema_relay::{build_app, RelayConfig, UpstreamClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RelayConfig::from_env();
    config
        .validate()
        .context("refusing to start with incomplete configuration")?;

    let listen_addr = config.listen_addr.clone();
    let app = build_app(UpstreamClient::new(config)?);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!("schema-relay listening on http://{listen_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
