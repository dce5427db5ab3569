//! The quota engine: shared state, admission, consumption, membership, and
//! admin operations.
//!
//! One constructed engine instance is passed to the scheduler and to the
//! admin surfaces — explicit dependency injection, no hidden singletons.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use engagehub_core::config::quota::QuotaConfig;
use engagehub_core::error::AppError;
use engagehub_core::result::AppResult;
use engagehub_core::traits::clock::Clock;
use engagehub_core::types::action::{ActionType, Distribution};
use engagehub_core::types::auth::ConnectedIdentity;
use engagehub_core::types::id::{AccountId, TweetId};
use engagehub_entity::account::{ConnectedAccount, DailyUsage};
use engagehub_entity::allocation::Allocation;
use engagehub_entity::daily::DailyQuota;
use engagehub_entity::history::ActionRecord;
use engagehub_entity::pack::{GlobalPack, PackType};
use engagehub_entity::state::QuotaState;
use engagehub_store::history::ActionHistory;
use engagehub_store::state::StateStore;

use crate::admission::{self, AdmissionDecision, DenialReason};
use crate::allocation;

/// Outcome of a consumption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The action was recorded against all counters and persisted.
    Recorded,
    /// Admission denied at consumption time; nothing was mutated.
    ///
    /// Legitimately happens after an earlier successful admission check when
    /// a concurrent consumption won the race for the last budget unit.
    Denied(DenialReason),
}

impl ConsumeOutcome {
    /// Whether the consumption was recorded.
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded)
    }

    /// The denial reason, if denied.
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Recorded => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}

/// Changes applied by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Accounts created because they were present in the authoritative
    /// snapshot but unknown to the store.
    pub added: usize,
    /// Inactive accounts reactivated.
    pub reactivated: usize,
    /// Active accounts deactivated because the snapshot no longer lists them.
    pub deactivated: usize,
}

impl ReconcileSummary {
    /// Whether anything changed (and thus one recalculation ran).
    pub fn changed(&self) -> bool {
        self.added + self.reactivated + self.deactivated > 0
    }
}

/// Per-account summary row for the stats snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    /// Platform account id.
    pub id: AccountId,
    /// Platform username.
    pub username: String,
    /// Whether the account is currently connected.
    pub is_active: bool,
    /// Cumulative actions against the current pack.
    pub actions_used: u64,
    /// Today's per-type counts.
    pub daily_used: DailyUsage,
    /// Today's total across types.
    pub daily_total: u64,
}

/// Full read-only stats snapshot for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// The shared pack.
    pub global_pack: GlobalPack,
    /// The shared daily quota.
    pub daily_quota: DailyQuota,
    /// The cached allocation.
    pub allocation: Allocation,
    /// Number of active accounts.
    pub active_accounts: usize,
    /// Per-account summaries, active and inactive.
    pub accounts: Vec<AccountStats>,
}

/// Owns the quota state and enforces the concurrency contract:
/// admission checks take a shared read snapshot, consumption holds the
/// write lock across re-check, counter updates, and the synchronous save.
#[derive(Debug)]
pub struct QuotaEngine {
    /// The single shared state record.
    state: RwLock<QuotaState>,
    /// Durable storage for the state record.
    store: Arc<dyn StateStore>,
    /// Append-only audit log of performed actions.
    history: Arc<dyn ActionHistory>,
    /// Injected time source.
    clock: Arc<dyn Clock>,
}

impl QuotaEngine {
    /// Create an engine over an already-loaded state.
    pub fn new(
        state: QuotaState,
        store: Arc<dyn StateStore>,
        history: Arc<dyn ActionHistory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            store,
            history,
            clock,
        }
    }

    /// Load the persisted state (or bootstrap a fresh one from config),
    /// repair invariants, and construct the engine.
    pub async fn open(
        store: Arc<dyn StateStore>,
        history: Arc<dyn ActionHistory>,
        clock: Arc<dyn Clock>,
        config: &QuotaConfig,
    ) -> AppResult<Self> {
        config.distribution.validate()?;

        let mut state = match store.load().await? {
            Some(state) => state,
            None => {
                let state = QuotaState::bootstrap(config, clock.now());
                info!(
                    total_actions = state.global_pack.total_actions,
                    daily_limit = state.daily_quota.daily_limit,
                    "No persisted quota state, bootstrapping from configuration"
                );
                store.save(&state).await?;
                state
            }
        };

        if state.validate_and_repair() {
            warn!("Loaded quota state violated invariants, repaired");
            store.save(&state).await?;
        }

        Ok(Self::new(state, store, history, clock))
    }

    /// Clone of the current state, for diagnostics and tests.
    pub async fn snapshot(&self) -> QuotaState {
        self.state.read().await.clone()
    }

    /// Ids of all currently active accounts.
    pub async fn active_account_ids(&self) -> Vec<AccountId> {
        self.state
            .read()
            .await
            .active_accounts()
            .map(|(id, _)| id.clone())
            .collect()
    }

    // ── Daily reset ──────────────────────────────────────────────

    /// Lazily roll the daily counters over to today.
    ///
    /// Idempotent: a second call on the same day is a no-op. The first
    /// caller after a UTC midnight pays the (cheap) reset cost; there is no
    /// background timer.
    pub async fn ensure_current_day(&self) -> AppResult<bool> {
        let today = self.clock.today();

        // Fast path: shared read, no mutation on the common case.
        if !self.state.read().await.daily_quota.needs_reset(today) {
            return Ok(false);
        }

        let mut state = self.state.write().await;
        // Re-check under the write lock; another caller may have reset.
        if !reset_day_if_stale(&mut state, today) {
            return Ok(false);
        }
        self.store.save(&state).await?;
        info!(%today, "Daily counters reset");
        Ok(true)
    }

    // ── Admission ────────────────────────────────────────────────

    /// Whether `account_id` may perform `action` right now.
    ///
    /// Runs the lazy daily reset first, then evaluates the pure admission
    /// predicate on a shared read snapshot — no exclusive lock on the
    /// read-heavy path.
    pub async fn can_perform_action(
        &self,
        account_id: &AccountId,
        action: ActionType,
    ) -> AppResult<AdmissionDecision> {
        self.ensure_current_day().await?;

        let state = self.state.read().await;
        Ok(admission::check(&state, account_id, action))
    }

    // ── Consumption ledger ───────────────────────────────────────

    /// Atomically record one performed action against all counters.
    ///
    /// Re-runs admission under the write lock immediately before mutating,
    /// so two concurrent consumptions can never jointly overspend a budget
    /// that only had room for one. On success the five counter updates
    /// (pack used/remaining, global daily, account cumulative, account
    /// per-type daily) are applied as one unit and the state is persisted
    /// before returning.
    pub async fn consume(
        &self,
        account_id: &AccountId,
        action: ActionType,
        tweet_id: &TweetId,
    ) -> AppResult<ConsumeOutcome> {
        let mut state = self.state.write().await;

        let day_rolled = reset_day_if_stale(&mut state, self.clock.today());

        let decision = admission::check(&state, account_id, action);
        if let Some(reason) = decision.denial_reason() {
            if day_rolled {
                self.store.save(&state).await?;
            }
            debug!(account = %account_id, %action, %reason, "Consumption denied");
            return Ok(ConsumeOutcome::Denied(reason));
        }

        state.global_pack.record_consumption();
        state.daily_quota.used_today += 1;
        let account = state
            .account_mut(account_id)
            .ok_or_else(|| AppError::quota("Admitted account vanished during consumption"))?;
        account.actions_used += 1;
        account.daily_used.increment(action);

        self.store.save(&state).await?;
        drop(state);

        let record = ActionRecord {
            tweet_id: tweet_id.clone(),
            account_id: account_id.clone(),
            action,
            timestamp: self.clock.now(),
        };
        if let Err(e) = self.history.append(&record).await {
            // The consumption is already durable in the state store; a
            // history gap only degrades later audits.
            tracing::error!(error = %e, "Failed to append action history record");
        }

        debug!(account = %account_id, %action, tweet = %tweet_id, "Action consumed");
        Ok(ConsumeOutcome::Recorded)
    }

    // ── Membership lifecycle ─────────────────────────────────────

    /// Register a connected account (or reactivate a known one) and
    /// recalculate the allocation.
    pub async fn add_connected_account(&self, identity: &ConnectedIdentity) -> AppResult<()> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        match state.account_mut(&identity.id) {
            Some(account) if account.is_active => {
                // Repeated auth of an already-active account; nothing to do.
                return Ok(());
            }
            Some(account) => {
                account.reactivate(now);
                account.username = identity.username.clone();
                info!(account = %identity.id, username = %identity.username, "Account reactivated");
            }
            None => {
                state.connected_accounts.insert(
                    identity.id.clone(),
                    ConnectedAccount::new(identity.username.clone(), identity.auth_method, now),
                );
                info!(account = %identity.id, username = %identity.username, "Account connected");
            }
        }

        recalculate_locked(&mut state, now);
        self.store.save(&state).await?;
        Ok(())
    }

    /// Soft-deactivate an account and recalculate the allocation.
    ///
    /// The shrunken divisor raises every remaining account's share at the
    /// next admission check.
    pub async fn remove_connected_account(&self, account_id: &AccountId) -> AppResult<()> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let account = state
            .account_mut(account_id)
            .ok_or_else(|| AppError::not_found(format!("Unknown account '{account_id}'")))?;

        if account.is_active {
            account.deactivate(now);
            recalculate_locked(&mut state, now);
            self.store.save(&state).await?;
            info!(account = %account_id, "Account disconnected");
        }

        Ok(())
    }

    /// Correct the store's view of active accounts against the auth
    /// subsystem's authoritative snapshot.
    ///
    /// Deactivates active-but-absent accounts, reactivates
    /// inactive-but-present ones, and creates present-but-unknown ones.
    /// Runs at most one recalculation, and persists only when something
    /// changed.
    pub async fn reconcile(&self, snapshot: &[ConnectedIdentity]) -> AppResult<ReconcileSummary> {
        let now = self.clock.now();
        let mut summary = ReconcileSummary::default();
        let mut state = self.state.write().await;

        for identity in snapshot {
            match state.account_mut(&identity.id) {
                Some(account) if !account.is_active => {
                    account.reactivate(now);
                    summary.reactivated += 1;
                }
                Some(_) => {}
                None => {
                    state.connected_accounts.insert(
                        identity.id.clone(),
                        ConnectedAccount::new(identity.username.clone(), identity.auth_method, now),
                    );
                    summary.added += 1;
                }
            }
        }

        let present: std::collections::BTreeSet<&AccountId> =
            snapshot.iter().map(|i| &i.id).collect();
        for (id, account) in state.connected_accounts.iter_mut() {
            if account.is_active && !present.contains(id) {
                account.deactivate(now);
                summary.deactivated += 1;
            }
        }

        if summary.changed() {
            recalculate_locked(&mut state, now);
            self.store.save(&state).await?;
            info!(
                added = summary.added,
                reactivated = summary.reactivated,
                deactivated = summary.deactivated,
                "Account reconciliation applied drift corrections"
            );
        }

        Ok(summary)
    }

    // ── Admin surface ────────────────────────────────────────────

    /// Re-purchase the global pack, resetting all pack-scoped usage
    /// counters and recalculating the allocation.
    pub async fn update_global_pack(
        &self,
        total_actions: u64,
        pack_type: PackType,
        expiry_date: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        state
            .global_pack
            .reset(total_actions, pack_type, now, expiry_date);
        for account in state.connected_accounts.values_mut() {
            account.actions_used = 0;
        }

        recalculate_locked(&mut state, now);
        self.store.save(&state).await?;
        info!(total_actions, %pack_type, "Global pack re-purchased");
        Ok(())
    }

    /// Manually zero today's counters (admin operation, independent of the
    /// date rollover).
    pub async fn reset_daily_counters(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        let today = self.clock.today();

        state.daily_quota.reset_for(today);
        for account in state.connected_accounts.values_mut() {
            account.daily_used.reset();
        }

        self.store.save(&state).await?;
        info!("Daily counters manually reset");
        Ok(())
    }

    /// Change the daily limit and optionally the per-type distribution.
    pub async fn set_daily_limit(
        &self,
        daily_limit: u64,
        distribution: Option<Distribution>,
    ) -> AppResult<()> {
        if let Some(distribution) = &distribution {
            distribution.validate()?;
        }

        let now = self.clock.now();
        let mut state = self.state.write().await;

        state.daily_quota.daily_limit = daily_limit;
        if let Some(distribution) = distribution {
            state.daily_quota.distribution = distribution;
        }

        // The per-account daily share derives from the limit; leaving the
        // cached allocation stale until the next membership change would
        // keep enforcing the old ceiling.
        recalculate_locked(&mut state, now);
        self.store.save(&state).await?;
        info!(daily_limit, "Daily quota updated");
        Ok(())
    }

    /// Full stats snapshot for dashboards and the CLI.
    pub async fn stats(&self) -> StatsSnapshot {
        let state = self.state.read().await;

        let accounts = state
            .connected_accounts
            .iter()
            .map(|(id, account)| AccountStats {
                id: id.clone(),
                username: account.username.clone(),
                is_active: account.is_active,
                actions_used: account.actions_used,
                daily_used: account.daily_used,
                daily_total: account.daily_used.total(),
            })
            .collect();

        StatsSnapshot {
            global_pack: state.global_pack.clone(),
            daily_quota: state.daily_quota.clone(),
            allocation: state.allocation,
            active_accounts: state.active_account_count(),
            accounts,
        }
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn history(&self) -> &dyn ActionHistory {
        self.history.as_ref()
    }

    pub(crate) async fn write_state(&self) -> tokio::sync::RwLockWriteGuard<'_, QuotaState> {
        self.state.write().await
    }

    pub(crate) async fn persist(&self, state: &QuotaState) -> AppResult<()> {
        self.store.save(state).await
    }
}

/// Zero the daily counters when `last_reset` is older than today.
fn reset_day_if_stale(state: &mut QuotaState, today: NaiveDate) -> bool {
    if !state.daily_quota.needs_reset(today) {
        return false;
    }

    state.daily_quota.reset_for(today);
    for account in state.connected_accounts.values_mut() {
        account.daily_used.reset();
    }
    true
}

/// Recompute the cached allocation from the current state.
fn recalculate_locked(state: &mut QuotaState, now: DateTime<Utc>) {
    state.allocation = allocation::recalculate(
        state.global_pack.remaining_actions,
        state.daily_quota.daily_limit,
        state.active_account_count() as u64,
        now,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagehub_core::traits::clock::ManualClock;
    use engagehub_core::types::auth::AuthMethod;
    use engagehub_store::history::MemoryHistory;
    use engagehub_store::memory::MemoryStateStore;

    fn identity(id: &str) -> ConnectedIdentity {
        ConnectedIdentity {
            id: AccountId::new(id),
            username: format!("user-{id}"),
            auth_method: AuthMethod::OAuth2,
        }
    }

    async fn engine() -> (Arc<QuotaEngine>, Arc<MemoryStateStore>, Arc<MemoryHistory>) {
        let store = Arc::new(MemoryStateStore::new());
        let history = Arc::new(MemoryHistory::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let engine = QuotaEngine::open(
            store.clone(),
            history.clone(),
            clock,
            &QuotaConfig::default(),
        )
        .await
        .expect("open");
        (Arc::new(engine), store, history)
    }

    #[tokio::test]
    async fn test_consume_updates_all_counters_and_persists() {
        let (engine, store, history) = engine().await;
        engine.add_connected_account(&identity("a")).await.expect("add");

        let outcome = engine
            .consume(&AccountId::new("a"), ActionType::Like, &TweetId::new("t1"))
            .await
            .expect("consume");
        assert!(outcome.is_recorded());

        let state = engine.snapshot().await;
        assert_eq!(state.global_pack.used_actions, 1);
        assert_eq!(state.global_pack.remaining_actions, 999);
        assert_eq!(state.daily_quota.used_today, 1);
        let account = state.account(&AccountId::new("a")).unwrap();
        assert_eq!(account.actions_used, 1);
        assert_eq!(account.daily_used.like, 1);

        // Persisted synchronously and recorded in the history log.
        assert_eq!(store.saved().await.expect("saved"), state);
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_denied_consume_mutates_nothing() {
        let (engine, _, history) = engine().await;

        let outcome = engine
            .consume(&AccountId::new("ghost"), ActionType::Like, &TweetId::new("t1"))
            .await
            .expect("consume");
        assert_eq!(
            outcome.denial_reason(),
            Some(DenialReason::NotConnected)
        );

        let state = engine.snapshot().await;
        assert_eq!(state.global_pack.used_actions, 0);
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_used_today_equals_sum_of_account_consumption() {
        let (engine, _, _) = engine().await;
        engine.add_connected_account(&identity("a")).await.expect("add");
        engine.add_connected_account(&identity("b")).await.expect("add");

        for (id, action) in [
            ("a", ActionType::Like),
            ("a", ActionType::Reply),
            ("b", ActionType::Reply),
        ] {
            let outcome = engine
                .consume(&AccountId::new(id), action, &TweetId::new("t"))
                .await
                .expect("consume");
            assert!(outcome.is_recorded());
        }

        let state = engine.snapshot().await;
        let sum: u64 = state
            .connected_accounts
            .values()
            .map(|a| a.daily_used.total())
            .sum();
        assert_eq!(state.daily_quota.used_today, sum);
        assert_eq!(sum, 3);
    }

    #[tokio::test]
    async fn test_add_remove_account_recalculates() {
        let (engine, _, _) = engine().await;

        engine.add_connected_account(&identity("a")).await.expect("add");
        let state = engine.snapshot().await;
        assert_eq!(state.allocation.per_account_quota, 1000);
        assert_eq!(state.allocation.per_account_daily, 100);

        engine.add_connected_account(&identity("b")).await.expect("add");
        let state = engine.snapshot().await;
        assert_eq!(state.allocation.per_account_quota, 500);
        assert_eq!(state.allocation.per_account_daily, 50);

        engine
            .remove_connected_account(&AccountId::new("b"))
            .await
            .expect("remove");
        let state = engine.snapshot().await;
        assert_eq!(state.allocation.per_account_quota, 1000);
        // The account survives deactivation with its history.
        assert!(state.account(&AccountId::new("b")).is_some());
    }

    #[tokio::test]
    async fn test_update_global_pack_resets_usage() {
        let (engine, _, _) = engine().await;
        engine.add_connected_account(&identity("a")).await.expect("add");
        engine
            .consume(&AccountId::new("a"), ActionType::Like, &TweetId::new("t"))
            .await
            .expect("consume");

        engine
            .update_global_pack(5000, PackType::Premium, None)
            .await
            .expect("update");

        let state = engine.snapshot().await;
        assert_eq!(state.global_pack.total_actions, 5000);
        assert_eq!(state.global_pack.used_actions, 0);
        assert_eq!(state.global_pack.remaining_actions, 5000);
        assert_eq!(state.account(&AccountId::new("a")).unwrap().actions_used, 0);
        assert_eq!(state.allocation.per_account_quota, 5000);
    }

    #[tokio::test]
    async fn test_set_daily_limit_revises_allocation() {
        let (engine, _, _) = engine().await;
        engine.add_connected_account(&identity("a")).await.expect("add");
        engine.add_connected_account(&identity("b")).await.expect("add");

        engine.set_daily_limit(200, None).await.expect("set");

        let state = engine.snapshot().await;
        assert_eq!(state.daily_quota.daily_limit, 200);
        assert_eq!(state.allocation.per_account_daily, 100);
    }
}
