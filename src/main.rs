// =============================================================================
// Nexus TA - Service Entry Point
// =============================================================================
//
// Serves the indicator engine over HTTP. Market data comes from the Binance
// public REST API; nothing is persisted between requests.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nexus_ta::api;
use nexus_ta::app_state::AppState;
use nexus_ta::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Nexus TA starting up");

    let config = ServiceConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    // ── 2. Shared state ──────────────────────────────────────────────────
    let state = Arc::new(AppState::with_binance(config).context("failed to build app state")?);
    info!(
        indicators = state.registry.list_available().len(),
        source = state.source.name(),
        "indicator registry ready"
    );

    // ── 3. API server ────────────────────────────────────────────────────
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("Nexus TA shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, stopping gracefully");
}
