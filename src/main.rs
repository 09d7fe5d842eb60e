// =============================================================================
// SCTR Picks API: Main Entry Point
// =============================================================================
//
// Serves the SCTR top-300 dashboard: ranking scrape, per-symbol performance
// and rebound indicators, and the QQQ benchmark, recomputed on every request.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod config;
mod dashboard;
mod indicators;
mod parallel;
mod resolver;
mod sources;
mod types;

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;
use crate::dashboard::{Dashboard, BENCHMARK_SYMBOL, DASHBOARD_WORKERS};
use crate::sources::{SctrClient, YahooClient};

const CONFIG_PATH: &str = "service_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ServiceConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ServiceConfig::default()
    });
    config.apply_env(|key| std::env::var(key).ok());

    info!(
        bind_addr = %config.bind_addr,
        history_range = %config.history_range,
        benchmark = BENCHMARK_SYMBOL,
        workers = DASHBOARD_WORKERS,
        "SCTR Picks API starting"
    );

    // ── 2. Upstream clients ──────────────────────────────────────────────
    let ranking = Arc::new(SctrClient::new(
        config.ranking_url.clone(),
        config.ranking_timeout(),
    ));
    let prices = Arc::new(YahooClient::new(
        config.price_base_url.clone(),
        config.history_range.clone(),
        config.http_timeout(),
    ));
    let dashboard = Arc::new(Dashboard::new(ranking, prices));

    // ── 3. API server ────────────────────────────────────────────────────
    let app = api::router(dashboard, &config.allowed_origins);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received, stopping gracefully");
        })
        .await?;

    info!("SCTR Picks API shut down complete.");
    Ok(())
}
