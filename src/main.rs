//! Trade Price - A price-distribution service
//!
//! Serves the latest vendor prices per instrument over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trade_price::api::create_router;
use trade_price::{
    spawn_eviction_task, spawn_file_ingest_task, spawn_queue_listener, AppState, Config,
    PriceQueue,
};

/// Main entry point for the price service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the price store selected by configuration
/// 4. Start background eviction, file ingestion and queue listener tasks
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trade_price=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Trade Price service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: mode={:?}, port={}, evict_days={}, evict_interval={}s, inbound={}",
        config.cache_mode,
        config.server_port,
        config.price_evict_days,
        config.evict_interval,
        config.inbound_directory.display()
    );

    let state = AppState::from_config(&config).context("failed to build price store")?;
    info!("Price store initialized");

    let (queue, inbox) = PriceQueue::channel(config.inbound_queue_capacity);

    let tasks = vec![
        spawn_eviction_task(
            state.service.clone(),
            chrono::Duration::days(i64::from(config.price_evict_days)),
            Duration::from_secs(config.evict_interval.max(1)),
        ),
        spawn_file_ingest_task(
            state.service.clone(),
            config.inbound_directory.clone(),
            Duration::from_millis(config.inbound_poll_interval_ms.max(1)),
        ),
        spawn_queue_listener(state.service.clone(), inbox),
    ];
    info!("Background tasks started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tasks))
        .await
        .context("server error")?;

    // Producers are gone once the server stops; closing lets the listener end
    drop(queue);
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and allows graceful shutdown.
async fn shutdown_signal(tasks: Vec<JoinHandle<()>>) {
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

    for task in tasks {
        task.abort();
    }
    warn!("Background tasks aborted");
}
