//! # VoxGate API Server
//!
//! This is the main API server for VoxGate, a gateway in front of a
//! third-party speech synthesis provider. It owns user accounts, tracks
//! synthesis tasks, receives provider callbacks, and relays finished
//! audio to the browser.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p voxgate-api
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voxgate_api::app::{build_router, AppState};
use voxgate_api::config::Config;
use voxgate_shared::db::migrations::run_migrations;
use voxgate_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use voxgate_shared::provider::HttpProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voxgate_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "VoxGate API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    let provider = Arc::new(HttpProvider::new(
        &config.provider.base_url,
        &config.provider.api_token,
    )?);

    // Separate client for the audio relay: no total-request timeout so
    // long audio streams are not cut off mid-transfer
    let relay = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config, provider, relay);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when the process receives Ctrl+C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(error) => {
            // Without a signal handler the server can only be killed hard
            tracing::error!("Failed to listen for shutdown signal: {}", error);
            std::future::pending::<()>().await;
        }
    }
}
