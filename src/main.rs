//! swapstop server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use swapstop::api;
use swapstop::app_state::AppState;
use swapstop::config::AppConfig;
use swapstop::domain::RoomRegistry;
use swapstop::persistence::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting swapstop");

    // Open database and apply migrations
    let store = Store::connect(&config)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    // Build application state; the room registry lives as long as the server
    let app_state = AppState::new(store, RoomRegistry::new());
    let app = api::build_app(app_state, config.request_timeout());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
