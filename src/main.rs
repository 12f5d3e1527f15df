//! Lake Cache - a persisted, time-expiring cache of lake conditions
//!
//! Serves the cache over HTTP and sweeps expired entries twice a day.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lake_cache::api::create_router;
use lake_cache::{AppState, Config, IntervalScheduler, LakeCache, SWEEP_TASK_ID};

/// Main entry point for the lake cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the SQLite store, create the cache and register its sweep
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lake_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lake Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: db={}, default_timeout={}s, sweep_interval={}s, policy={:?}, port={}",
        config.db_path.display(),
        config.default_timeout,
        config.sweep_interval,
        config.update_policy,
        config.server_port
    );

    let scheduler = Arc::new(IntervalScheduler::new());
    let state = AppState::from_config(&config, scheduler.as_ref())
        .with_context(|| format!("failed to open cache at {}", config.db_path.display()))?;
    info!("Cache store initialized");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(scheduler, state.cache.clone()))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, cancels the sweep and lets pending evictions finish.
async fn shutdown_signal(scheduler: Arc<IntervalScheduler>, cache: Arc<LakeCache>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if scheduler.cancel(SWEEP_TASK_ID) {
        warn!("Sweep task cancelled");
    }
    cache.flush_evictions().await;
}
