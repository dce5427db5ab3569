//! Long-running scheduler loops with watch-channel cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{error, info};

use engagehub_core::config::scheduler::SchedulerConfig;
use engagehub_core::traits::clock::Clock;
use engagehub_core::traits::connections::ConnectionProvider;
use engagehub_core::traits::platform::PlatformClient;
use engagehub_quota::QuotaEngine;

use crate::delay::DelayPolicy;
use crate::planner::ActionPlanner;
use crate::scan::{perform_and_consume, AttemptResult, ScanRunner};

/// Interval-driven scan loop.
#[derive(Debug)]
pub struct ScanScheduler {
    runner: Arc<ScanRunner>,
    interval_seconds: u64,
}

impl ScanScheduler {
    /// Create a loop around the scan runner.
    pub fn new(runner: Arc<ScanRunner>, config: &SchedulerConfig) -> Self {
        Self {
            runner,
            interval_seconds: config.scan_interval_seconds,
        }
    }

    /// Run scan cycles until the cancel signal flips.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = self.interval_seconds,
            "Scan scheduler started"
        );
        let interval = Duration::from_secs(self.interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Scan scheduler received shutdown signal");
                        break;
                    }
                }
                result = self.runner.run_cycle() => {
                    if let Err(e) = result {
                        error!(error = %e, "Scan cycle failed");
                    }
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                info!("Scan scheduler shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(interval) => {}
                    }
                }
            }
        }
    }
}

/// Periodic reconciliation of the quota store against the authoritative
/// connection snapshot.
#[derive(Debug)]
pub struct ReconcileLoop {
    engine: Arc<QuotaEngine>,
    connections: Arc<dyn ConnectionProvider>,
    interval_seconds: u64,
}

impl ReconcileLoop {
    /// Create a loop over the engine and connection provider.
    pub fn new(
        engine: Arc<QuotaEngine>,
        connections: Arc<dyn ConnectionProvider>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            engine,
            connections,
            interval_seconds: config.reconcile_interval_seconds,
        }
    }

    /// One reconciliation pass.
    pub async fn reconcile_once(&self) {
        let snapshot = match self.connections.connected_identities().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to read connection snapshot");
                return;
            }
        };

        match self.engine.reconcile(&snapshot).await {
            Ok(summary) if summary.changed() => {
                info!(
                    added = summary.added,
                    reactivated = summary.reactivated,
                    deactivated = summary.deactivated,
                    "Reconciliation corrected membership drift"
                );
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Reconciliation failed"),
        }
    }

    /// Run until the cancel signal flips.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = self.interval_seconds,
            "Reconcile loop started"
        );
        let interval = Duration::from_secs(self.interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Reconcile loop received shutdown signal");
                        break;
                    }
                }
                _ = time::sleep(interval) => {
                    self.reconcile_once().await;
                }
            }
        }
    }
}

/// Dispatch loop draining due smart-scheduled actions.
#[derive(Debug)]
pub struct DispatchLoop {
    planner: Arc<ActionPlanner>,
    engine: Arc<QuotaEngine>,
    connections: Arc<dyn ConnectionProvider>,
    platform: Arc<dyn PlatformClient>,
    clock: Arc<dyn Clock>,
    delays: DelayPolicy,
    interval_seconds: u64,
}

impl DispatchLoop {
    /// Wire the dispatch loop from its collaborators.
    pub fn new(
        planner: Arc<ActionPlanner>,
        engine: Arc<QuotaEngine>,
        connections: Arc<dyn ConnectionProvider>,
        platform: Arc<dyn PlatformClient>,
        clock: Arc<dyn Clock>,
        delays: DelayPolicy,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            planner,
            engine,
            connections,
            platform,
            clock,
            delays,
            interval_seconds: config.smart.dispatch_interval_seconds,
        }
    }

    /// Dispatch everything currently due. Returns the number performed.
    pub async fn dispatch_due(&self) -> u64 {
        let due = self.planner.take_due(self.clock.now()).await;
        let mut performed = 0;

        for action in due {
            // Quota conditions may have changed since the scan deferred
            // this action; re-check before performing.
            let decision = match self
                .engine
                .can_perform_action(&action.account_id, action.action)
                .await
            {
                Ok(decision) => decision,
                Err(e) => {
                    error!(id = %action.id, error = %e, "Admission re-check failed");
                    continue;
                }
            };
            if let Some(reason) = decision.denial_reason() {
                info!(id = %action.id, %reason, "Dropping deferred action");
                continue;
            }

            let result = perform_and_consume(
                &self.engine,
                self.connections.as_ref(),
                self.platform.as_ref(),
                &action.account_id,
                action.action,
                &action.tweet_id,
            )
            .await;
            if result == AttemptResult::Performed {
                performed += 1;
            }

            self.delays.pause_after(action.action).await;
        }

        performed
    }

    /// Run until the cancel signal flips.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = self.interval_seconds,
            "Dispatch loop started"
        );
        let interval = Duration::from_secs(self.interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Dispatch loop received shutdown signal");
                        break;
                    }
                }
                _ = time::sleep(interval) => {
                    self.dispatch_due().await;
                }
            }
        }
    }
}
