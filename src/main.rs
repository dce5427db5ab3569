//! EngageHub Server — engagement automation daemon.
//!
//! Main entry point that wires all crates together and starts the
//! scheduler loops.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use engagehub_core::config::AppConfig;
use engagehub_core::error::AppError;
use engagehub_core::traits::clock::SystemClock;
use engagehub_core::traits::connections::ConnectionProvider;
use engagehub_core::traits::content::ContentSource;
use engagehub_core::traits::platform::PlatformClient;
use engagehub_platform::{FileConnectionProvider, HttpContentSource, HttpPlatformClient};
use engagehub_quota::QuotaEngine;
use engagehub_scheduler::{
    ActionPlanner, ActionSelector, DelayPolicy, DispatchLoop, ReconcileLoop, ScanGuard,
    ScanRunner, ScanScheduler, ScanWatchdog,
};
use engagehub_store::history::JsonlHistoryLog;
use engagehub_store::json::JsonStateStore;

#[tokio::main]
async fn main() {
    let env = std::env::var("ENGAGEHUB_ENV").unwrap_or_else(|_| "default".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EngageHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Create data directories ──────────────────────────
    create_data_directories(&config).await?;

    // ── Step 2: Storage and quota engine ─────────────────────────
    let store = Arc::new(JsonStateStore::new(&config.store.state_file));
    let history = Arc::new(JsonlHistoryLog::new(&config.store.history_file));
    let clock = Arc::new(SystemClock);

    tracing::info!("Opening quota state...");
    let engine = Arc::new(QuotaEngine::open(store, history, clock.clone(), &config.quota).await?);
    tracing::info!("Quota engine ready");

    // ── Step 3: Platform adapters ────────────────────────────────
    let connections: Arc<dyn ConnectionProvider> = Arc::new(FileConnectionProvider::new(
        &config.platform.connections_file,
    ));
    let platform: Arc<dyn PlatformClient> = Arc::new(HttpPlatformClient::new(&config.platform)?);
    let content: Arc<dyn ContentSource> = Arc::new(HttpContentSource::new(&config.platform)?);

    // ── Step 4: Startup reconciliation ───────────────────────────
    tracing::info!("Reconciling accounts against the connection snapshot...");
    match connections.connected_identities().await {
        Ok(snapshot) => {
            let summary = engine.reconcile(&snapshot).await?;
            tracing::info!(
                added = summary.added,
                reactivated = summary.reactivated,
                deactivated = summary.deactivated,
                "Startup reconciliation complete"
            );
        }
        Err(e) => {
            // The periodic loop retries; stale membership is tolerable at
            // startup, a refusal to start is not.
            tracing::warn!(error = %e, "Startup reconciliation skipped");
        }
    }

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 6: Scheduler loops ──────────────────────────────────
    let mut handles = Vec::new();

    let reconcile_loop = ReconcileLoop::new(
        Arc::clone(&engine),
        Arc::clone(&connections),
        &config.scheduler,
    );
    let reconcile_cancel = shutdown_rx.clone();
    handles.push(tokio::spawn(async move {
        reconcile_loop.run(reconcile_cancel).await;
    }));

    if config.scheduler.enabled {
        let guard = Arc::new(ScanGuard::new());
        let planner = if config.scheduler.smart.enabled {
            tracing::info!("Smart scheduling enabled");
            Some(Arc::new(ActionPlanner::new(clock.clone())))
        } else {
            None
        };

        let runner = Arc::new(ScanRunner::new(
            Arc::clone(&engine),
            Arc::clone(&platform),
            Arc::clone(&content),
            Arc::clone(&connections),
            Arc::clone(&guard),
            clock.clone(),
            ActionSelector::new(config.scheduler.probabilities),
            DelayPolicy::new(config.scheduler.delays.clone()),
            planner.clone(),
        ));

        let scheduler = ScanScheduler::new(runner, &config.scheduler);
        let scan_cancel = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run(scan_cancel).await;
        }));

        let watchdog = ScanWatchdog::new(guard, clock.clone(), config.scheduler.watchdog.clone());
        let watchdog_cancel = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            watchdog.run(watchdog_cancel).await;
        }));

        if let Some(planner) = planner {
            let dispatch = DispatchLoop::new(
                planner,
                Arc::clone(&engine),
                Arc::clone(&connections),
                Arc::clone(&platform),
                clock.clone(),
                DelayPolicy::new(config.scheduler.delays.clone()),
                &config.scheduler,
            );
            let dispatch_cancel = shutdown_rx.clone();
            handles.push(tokio::spawn(async move {
                dispatch.run(dispatch_cancel).await;
            }));
        }

        tracing::info!("Scheduler loops started");
    } else {
        tracing::info!("Scan scheduler disabled");
    }

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    for handle in handles {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("EngageHub server shut down gracefully");
    Ok(())
}

/// Create required data directories
async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let files = [&config.store.state_file, &config.store.history_file];

    for file in files {
        if let Some(parent) = std::path::Path::new(file).parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::internal(format!(
                    "Failed to create dir '{}': {e}",
                    parent.display()
                ))
            })?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
