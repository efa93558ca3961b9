// =============================================================================
// Indicator Engine — Main Entry Point
// =============================================================================
//
// Two modes:
//   indicator-engine            HTTP server on the configured bind address
//   indicator-engine --stdin    read one request from stdin, answer on stdout
//
// The backend capability is read from config once here and injected into the
// dispatcher; nothing below consults global state for it.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use indicator_engine::api;
use indicator_engine::app_state::AppState;
use indicator_engine::runtime_config::EngineConfig;
use indicator_engine::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env();

    // ── 2. One-shot stdin mode ───────────────────────────────────────────
    if std::env::args().skip(1).any(|arg| arg == "--stdin") {
        let dispatcher = Dispatcher::new(config.backend_capability());
        let ok = tokio::task::spawn_blocking(move || {
            api::stdio::run(&dispatcher, std::io::stdin().lock(), std::io::stdout().lock())
        })
        .await
        .context("stdin runner panicked")??;
        std::process::exit(if ok { 0 } else { 1 });
    }

    // ── 3. HTTP server ───────────────────────────────────────────────────
    info!(
        bind_addr = %config.bind_addr,
        native_backend = config.native_backend,
        "Indicator engine starting"
    );

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));
    let app = api::rest::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received, stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("Indicator engine shut down complete.");
    Ok(())
}
