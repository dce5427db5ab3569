//! The scan cycle: candidates × accounts × selected action types.

use std::sync::Arc;

use tracing::{debug, info, warn};

use engagehub_core::result::AppResult;
use engagehub_core::traits::clock::Clock;
use engagehub_core::traits::connections::ConnectionProvider;
use engagehub_core::traits::platform::PlatformClient;
use engagehub_core::types::action::ActionType;
use engagehub_core::types::id::{AccountId, TweetId};
use engagehub_quota::{ConsumeOutcome, QuotaEngine};

use crate::delay::DelayPolicy;
use crate::guard::ScanGuard;
use crate::planner::ActionPlanner;
use crate::selection::ActionSelector;

/// Tallies of one scan cycle, for the cycle-end log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Candidates fetched this cycle.
    pub candidates: usize,
    /// Action attempts after selection.
    pub attempted: u64,
    /// Actions performed and consumed.
    pub performed: u64,
    /// Attempts denied by admission control.
    pub denied: u64,
    /// Attempts that failed at the platform (or its transport).
    pub failed: u64,
    /// Attempts deferred into the smart-scheduling planner.
    pub deferred: u64,
}

/// Result of performing one admitted action end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttemptResult {
    /// Performed on the platform and consumed from the quota.
    Performed,
    /// Platform (or transport) failure; quota untouched.
    Failed,
    /// Lost the consumption race after performing; quota untouched by us.
    DeniedAtConsume,
}

/// Perform one admitted action: fetch credentials, call the platform
/// outside any quota lock, and consume only on reported success.
pub(crate) async fn perform_and_consume(
    engine: &QuotaEngine,
    connections: &dyn ConnectionProvider,
    platform: &dyn PlatformClient,
    account_id: &AccountId,
    action: ActionType,
    tweet_id: &TweetId,
) -> AttemptResult {
    let credentials = match connections.credentials_for(account_id).await {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!(account = %account_id, error = %e, "No credentials for admitted account");
            return AttemptResult::Failed;
        }
    };

    let outcome = match platform.perform_action(&credentials, action, tweet_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(account = %account_id, %action, error = %e, "Platform call failed");
            return AttemptResult::Failed;
        }
    };

    if !outcome.success {
        debug!(
            account = %account_id,
            %action,
            error_code = outcome.error_code.as_deref().unwrap_or("unknown"),
            "Platform reported action as failed"
        );
        return AttemptResult::Failed;
    }

    match engine.consume(account_id, action, tweet_id).await {
        Ok(ConsumeOutcome::Recorded) => AttemptResult::Performed,
        Ok(ConsumeOutcome::Denied(reason)) => {
            // The action already happened on the platform; losing the
            // consumption race is rare and only under-counts by design.
            warn!(account = %account_id, %action, %reason, "Consumption denied after performing");
            AttemptResult::DeniedAtConsume
        }
        Err(e) => {
            warn!(account = %account_id, %action, error = %e, "Consumption bookkeeping failed");
            AttemptResult::Failed
        }
    }
}

/// Drives one scan cycle over candidates and active accounts.
#[derive(Debug)]
pub struct ScanRunner {
    engine: Arc<QuotaEngine>,
    platform: Arc<dyn PlatformClient>,
    content: Arc<dyn engagehub_core::traits::content::ContentSource>,
    connections: Arc<dyn ConnectionProvider>,
    guard: Arc<ScanGuard>,
    clock: Arc<dyn Clock>,
    selector: ActionSelector,
    delays: DelayPolicy,
    /// Present only with smart scheduling enabled; admitted actions are
    /// deferred into it instead of executed inline.
    planner: Option<Arc<ActionPlanner>>,
}

impl ScanRunner {
    /// Wire a runner from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<QuotaEngine>,
        platform: Arc<dyn PlatformClient>,
        content: Arc<dyn engagehub_core::traits::content::ContentSource>,
        connections: Arc<dyn ConnectionProvider>,
        guard: Arc<ScanGuard>,
        clock: Arc<dyn Clock>,
        selector: ActionSelector,
        delays: DelayPolicy,
        planner: Option<Arc<ActionPlanner>>,
    ) -> Self {
        Self {
            engine,
            platform,
            content,
            connections,
            guard,
            clock,
            selector,
            delays,
            planner,
        }
    }

    /// Run one scan cycle.
    ///
    /// Returns `None` when another scan holds the guard. The guard is
    /// released on every exit path, including candidate-fetch failure.
    pub async fn run_cycle(&self) -> AppResult<Option<ScanSummary>> {
        if !self.guard.try_begin(self.clock.now()) {
            warn!("Previous scan still running, skipping this cycle");
            return Ok(None);
        }

        let result = self.scan_inner().await;
        self.guard.finish();

        match result {
            Ok(summary) => {
                info!(
                    candidates = summary.candidates,
                    attempted = summary.attempted,
                    performed = summary.performed,
                    denied = summary.denied,
                    failed = summary.failed,
                    deferred = summary.deferred,
                    "Scan cycle complete"
                );
                Ok(Some(summary))
            }
            Err(e) => Err(e),
        }
    }

    async fn scan_inner(&self) -> AppResult<ScanSummary> {
        let mut summary = ScanSummary::default();

        let candidates = self.content.fetch_candidates().await?;
        summary.candidates = candidates.len();
        if candidates.is_empty() {
            return Ok(summary);
        }

        let accounts = self.engine.active_account_ids().await;

        for candidate in &candidates {
            for (index, account_id) in accounts.iter().enumerate() {
                if index > 0 {
                    self.delays.pause_between_accounts().await;
                }

                // ThreadRng is !Send; sample the whole plan before awaiting.
                let plan = {
                    let mut rng = rand::rng();
                    self.selector.plan(&mut rng)
                };

                for action in plan {
                    summary.attempted += 1;

                    let decision = self.engine.can_perform_action(account_id, action).await?;
                    if let Some(reason) = decision.denial_reason() {
                        debug!(account = %account_id, %action, %reason, "Attempt not admitted");
                        summary.denied += 1;
                        continue;
                    }

                    if let Some(planner) = &self.planner {
                        planner
                            .defer(account_id.clone(), candidate.id.clone(), action)
                            .await;
                        summary.deferred += 1;
                        continue;
                    }

                    match perform_and_consume(
                        &self.engine,
                        self.connections.as_ref(),
                        self.platform.as_ref(),
                        account_id,
                        action,
                        &candidate.id,
                    )
                    .await
                    {
                        AttemptResult::Performed => summary.performed += 1,
                        AttemptResult::Failed => summary.failed += 1,
                        AttemptResult::DeniedAtConsume => summary.denied += 1,
                    }

                    self.delays.pause_after(action).await;
                }
            }
        }

        Ok(summary)
    }
}
