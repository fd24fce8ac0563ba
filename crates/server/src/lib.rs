pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

use crate::{
    config::{get_config, AppConfig},
    router::create_router,
    state::build_app_state,
};
use anyhow::Context;
use prodspec::BatchResponse;
use serde_json::Value;
use std::{net::SocketAddr, path::Path};
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

/// Installs the global compact subscriber filtered by `RUST_LOG`.
pub fn init_tracing() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

/// Configures and runs the web server.
///
/// This function initializes the application state, creates the router,
/// and starts the Axum server.
pub async fn run(listener: TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Server configuration loaded");

    let app_state = build_app_state(config).await?;
    let app = create_router(app_state);

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Processes a single notification document read from `event_path` and
/// returns the batch response without starting a server.
pub async fn invoke(config: AppConfig, event_path: &Path) -> anyhow::Result<BatchResponse> {
    let raw = tokio::fs::read_to_string(event_path)
        .await
        .with_context(|| format!("Failed to read event file '{}'", event_path.display()))?;
    let event: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Event file '{}' is not valid JSON", event_path.display()))?;

    let app_state = build_app_state(config).await?;
    Ok(app_state.handler.handle_notification(&event).await)
}

/// Loads the configuration, binds the TCP listener and calls `run`.
pub async fn start(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = get_config(config_path)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    run(listener, config).await
}
