//! End-to-end quota engine scenarios over in-memory storage and a manual
//! clock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use engagehub_core::config::quota::QuotaConfig;
use engagehub_core::traits::clock::{Clock, ManualClock};
use engagehub_core::types::action::{ActionType, Distribution};
use engagehub_core::types::auth::{AuthMethod, ConnectedIdentity};
use engagehub_core::types::id::{AccountId, TweetId};
use engagehub_entity::history::ActionRecord;
use engagehub_entity::pack::PackType;
use engagehub_quota::{DenialReason, QuotaEngine};
use engagehub_store::history::MemoryHistory;
use engagehub_store::memory::MemoryStateStore;
use engagehub_store::StateStore;

struct Harness {
    engine: QuotaEngine,
    store: Arc<MemoryStateStore>,
    history: Arc<MemoryHistory>,
    clock: Arc<ManualClock>,
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStateStore::new());
    let history = Arc::new(MemoryHistory::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
    ));
    let engine = QuotaEngine::open(
        store.clone(),
        history.clone(),
        clock.clone(),
        &QuotaConfig::default(),
    )
    .await
    .expect("open engine");
    Harness {
        engine,
        store,
        history,
        clock,
    }
}

fn identity(id: &str) -> ConnectedIdentity {
    ConnectedIdentity {
        id: AccountId::new(id),
        username: format!("user-{id}"),
        auth_method: AuthMethod::OAuth2,
    }
}

async fn connect(engine: &QuotaEngine, id: &str) {
    engine
        .add_connected_account(&identity(id))
        .await
        .expect("connect account");
}

#[tokio::test]
async fn test_fresh_pack_splits_evenly_between_two_accounts() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    connect(&h.engine, "b").await;

    let state = h.engine.snapshot().await;
    assert_eq!(state.allocation.per_account_quota, 500);
    assert_eq!(state.allocation.per_account_daily, 50);

    // Default distribution 45/10/45 of the daily 50.
    let distribution = &state.daily_quota.distribution;
    assert_eq!(
        state
            .allocation
            .per_type_daily_quota(distribution, ActionType::Like),
        22
    );
    assert_eq!(
        state
            .allocation
            .per_type_daily_quota(distribution, ActionType::Retweet),
        5
    );
    assert_eq!(
        state
            .allocation
            .per_type_daily_quota(distribution, ActionType::Reply),
        22
    );
}

#[tokio::test]
async fn test_like_sub_quota_exhausts_while_replies_continue() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    connect(&h.engine, "b").await;
    let a = AccountId::new("a");

    // Like sub-quota for a 50-action daily share is 22.
    for i in 0..22 {
        let outcome = h
            .engine
            .consume(&a, ActionType::Like, &TweetId::new(format!("t{i}")))
            .await
            .expect("consume");
        assert!(outcome.is_recorded(), "like {i} should be admitted");
    }

    let outcome = h
        .engine
        .consume(&a, ActionType::Like, &TweetId::new("t-next"))
        .await
        .expect("consume");
    assert_eq!(
        outcome.denial_reason(),
        Some(DenialReason::TypeQuotaExhausted(ActionType::Like))
    );
    assert_eq!(
        outcome.denial_reason().unwrap().to_string(),
        "daily quota exhausted for like"
    );

    // The reply sub-quota is untouched.
    let decision = h
        .engine
        .can_perform_action(&a, ActionType::Reply)
        .await
        .expect("check");
    assert!(decision.is_allowed());
}

#[tokio::test]
async fn test_disconnect_raises_surviving_accounts_share() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    connect(&h.engine, "b").await;

    h.engine
        .remove_connected_account(&AccountId::new("b"))
        .await
        .expect("disconnect");

    let state = h.engine.snapshot().await;
    assert_eq!(state.active_account_count(), 1);
    assert_eq!(state.allocation.per_account_quota, 1000);
    assert_eq!(state.allocation.per_account_daily, 100);

    // The disconnected account is denied, not unknown-erroring.
    let decision = h
        .engine
        .can_perform_action(&AccountId::new("b"), ActionType::Like)
        .await
        .expect("check");
    assert_eq!(decision.denial_reason(), Some(DenialReason::NotConnected));
    assert_eq!(
        decision.denial_reason().unwrap().to_string(),
        "account not connected or inactive"
    );
}

#[tokio::test]
async fn test_midnight_rollover_resets_daily_not_pack() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    let a = AccountId::new("a");

    for i in 0..10 {
        let outcome = h
            .engine
            .consume(&a, ActionType::Reply, &TweetId::new(format!("t{i}")))
            .await
            .expect("consume");
        assert!(outcome.is_recorded());
    }

    let state = h.engine.snapshot().await;
    assert_eq!(state.daily_quota.used_today, 10);
    assert_eq!(state.global_pack.used_actions, 10);

    h.clock.advance_days(1);
    let reset = h.engine.ensure_current_day().await.expect("rollover");
    assert!(reset);

    let state = h.engine.snapshot().await;
    assert_eq!(state.daily_quota.used_today, 0);
    assert_eq!(state.account(&a).unwrap().daily_used.total(), 0);
    // Pack-scoped counters are untouched by the day boundary.
    assert_eq!(state.global_pack.used_actions, 10);
    assert_eq!(state.account(&a).unwrap().actions_used, 10);

    // Second call on the same day is a no-op.
    assert!(!h.engine.ensure_current_day().await.expect("repeat"));
}

#[tokio::test]
async fn test_consume_triggers_lazy_rollover() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    let a = AccountId::new("a");

    h.engine
        .consume(&a, ActionType::Like, &TweetId::new("t1"))
        .await
        .expect("consume");
    h.clock.advance_days(1);

    // No explicit rollover call; consumption itself rolls the day first.
    let outcome = h
        .engine
        .consume(&a, ActionType::Like, &TweetId::new("t2"))
        .await
        .expect("consume");
    assert!(outcome.is_recorded());

    let state = h.engine.snapshot().await;
    assert_eq!(state.daily_quota.used_today, 1);
    assert_eq!(state.account(&a).unwrap().daily_used.like, 1);
    assert_eq!(state.account(&a).unwrap().actions_used, 2);
}

#[tokio::test]
async fn test_concurrent_consumption_never_overspends_last_unit() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    connect(&h.engine, "b").await;

    // Leave exactly one unit in the pack.
    {
        let mut state = h.engine.snapshot().await;
        state.global_pack.used_actions = 999;
        state.global_pack.remaining_actions = 1;
        // Reopen over the doctored state so both admission and consumption
        // see one remaining unit.
        let engine = QuotaEngine::open(
            Arc::new(MemoryStateStore::with_state(state)),
            h.history.clone(),
            h.clock.clone(),
            &QuotaConfig::default(),
        )
        .await
        .expect("reopen");

        let a = AccountId::new("a");
        let b = AccountId::new("b");

        // Both admission checks pass on the same snapshot.
        assert!(engine
            .can_perform_action(&a, ActionType::Reply)
            .await
            .expect("check")
            .is_allowed());
        assert!(engine
            .can_perform_action(&b, ActionType::Reply)
            .await
            .expect("check")
            .is_allowed());

        let t1 = TweetId::new("t1");
        let t2 = TweetId::new("t2");
        let (first, second) = tokio::join!(
            engine.consume(&a, ActionType::Reply, &t1),
            engine.consume(&b, ActionType::Reply, &t2),
        );
        let first = first.expect("consume a");
        let second = second.expect("consume b");

        // Exactly one wins; the loser is denied at consumption time.
        assert_ne!(first.is_recorded(), second.is_recorded());
        let denied = [first, second]
            .into_iter()
            .find_map(|o| o.denial_reason())
            .expect("one denial");
        assert_eq!(denied, DenialReason::PackExhausted);

        let state = engine.snapshot().await;
        assert_eq!(state.global_pack.remaining_actions, 0);
        assert_eq!(state.global_pack.used_actions, 1000);
    }
}

#[tokio::test]
async fn test_individual_quota_binds_before_global_pack() {
    let h = harness().await;
    let clock = h.clock.clone();
    let history = h.history.clone();

    // Tiny pack so the per-account share is reachable in a test: 10 total,
    // 2 accounts → 5 each; generous daily limit so only the pack share binds.
    let config = QuotaConfig {
        daily_limit: 1000,
        pack: engagehub_core::config::quota::PackConfig {
            total_actions: 10,
            pack_type: "basic".to_string(),
        },
        ..QuotaConfig::default()
    };
    let engine = QuotaEngine::open(Arc::new(MemoryStateStore::new()), history, clock, &config)
        .await
        .expect("open");
    connect(&engine, "a").await;
    connect(&engine, "b").await;
    let a = AccountId::new("a");

    for i in 0..5 {
        let outcome = engine
            .consume(&a, ActionType::Reply, &TweetId::new(format!("t{i}")))
            .await
            .expect("consume");
        assert!(outcome.is_recorded());
    }

    let outcome = engine
        .consume(&a, ActionType::Reply, &TweetId::new("t-over"))
        .await
        .expect("consume");
    assert_eq!(
        outcome.denial_reason(),
        Some(DenialReason::IndividualQuotaExhausted)
    );

    // The other account's share is unaffected.
    assert!(engine
        .can_perform_action(&AccountId::new("b"), ActionType::Reply)
        .await
        .expect("check")
        .is_allowed());
}

#[tokio::test]
async fn test_reconcile_corrects_membership_drift() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    connect(&h.engine, "b").await;
    connect(&h.engine, "c").await;

    // Authoritative snapshot: "a" still present, "b"/"c" gone, "d" new.
    let snapshot = vec![identity("a"), identity("d")];
    let summary = h.engine.reconcile(&snapshot).await.expect("reconcile");

    assert_eq!(summary.added, 1);
    assert_eq!(summary.deactivated, 2);
    assert_eq!(summary.reactivated, 0);
    assert!(summary.changed());

    let state = h.engine.snapshot().await;
    assert_eq!(state.active_account_count(), 2);
    assert!(state.account(&AccountId::new("b")).is_some_and(|a| !a.is_active));
    assert!(state.account(&AccountId::new("d")).is_some_and(|a| a.is_active));
    assert_eq!(state.allocation.per_account_quota, 500);

    // Re-running against the same snapshot changes nothing.
    let summary = h.engine.reconcile(&snapshot).await.expect("reconcile");
    assert!(!summary.changed());

    // A returning account is reactivated with its history intact.
    let summary = h
        .engine
        .reconcile(&[identity("a"), identity("b"), identity("d")])
        .await
        .expect("reconcile");
    assert_eq!(summary.reactivated, 1);
    assert!(h
        .engine
        .snapshot()
        .await
        .account(&AccountId::new("b"))
        .is_some_and(|a| a.is_active));
}

#[tokio::test]
async fn test_pack_repurchase_resets_usage_and_allocation() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    let a = AccountId::new("a");
    h.engine
        .consume(&a, ActionType::Like, &TweetId::new("t1"))
        .await
        .expect("consume");

    h.engine
        .update_global_pack(2000, PackType::Premium, None)
        .await
        .expect("repurchase");

    let state = h.engine.snapshot().await;
    assert_eq!(state.global_pack.remaining_actions, 2000);
    assert_eq!(state.global_pack.pack_type, PackType::Premium);
    assert_eq!(state.account(&a).unwrap().actions_used, 0);
    // Daily counters are pack-independent and keep today's usage.
    assert_eq!(state.daily_quota.used_today, 1);
    assert_eq!(state.allocation.per_account_quota, 2000);
}

#[tokio::test]
async fn test_engine_state_survives_restart() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    h.engine
        .consume(&AccountId::new("a"), ActionType::Reply, &TweetId::new("t1"))
        .await
        .expect("consume");

    // A second engine over the same store sees the persisted counters.
    let reopened = QuotaEngine::open(
        h.store.clone(),
        h.history.clone(),
        h.clock.clone(),
        &QuotaConfig::default(),
    )
    .await
    .expect("reopen");

    let state = reopened.snapshot().await;
    assert_eq!(state.global_pack.used_actions, 1);
    assert_eq!(state.account(&AccountId::new("a")).unwrap().actions_used, 1);
}

#[tokio::test]
async fn test_repair_account_rebuilds_counters_from_history() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    let a = AccountId::new("a");

    for action in [ActionType::Like, ActionType::Like, ActionType::Reply] {
        h.engine
            .consume(&a, action, &TweetId::new("t"))
            .await
            .expect("consume");
    }

    // Drift the stored counter by hand, as a crashed writer might.
    {
        let mut state = h.engine.snapshot().await;
        state.account_mut(&a).unwrap().actions_used = 99;
        h.store.save(&state).await.expect("save");
    }
    let engine = QuotaEngine::open(
        h.store.clone(),
        h.history.clone(),
        h.clock.clone(),
        &QuotaConfig::default(),
    )
    .await
    .expect("reopen");

    let totals = engine.repair_account(&a).await.expect("repair");
    assert_eq!(totals.actions_used, 3);
    assert_eq!(totals.daily_used.like, 2);
    assert_eq!(totals.daily_used.reply, 1);

    let state = engine.snapshot().await;
    assert_eq!(state.account(&a).unwrap().actions_used, 3);
}

#[tokio::test]
async fn test_repair_all_rebuilds_shared_counters() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    connect(&h.engine, "b").await;

    // Seed history directly; stored counters never saw these actions.
    for account in ["a", "a", "b"] {
        h.history
            .push(ActionRecord {
                tweet_id: TweetId::new("t"),
                account_id: AccountId::new(account),
                action: ActionType::Reply,
                timestamp: h.clock.now(),
            })
            .await;
    }

    let changed = h.engine.repair_all_from_history().await.expect("repair");
    assert!(changed);

    let state = h.engine.snapshot().await;
    assert_eq!(state.global_pack.used_actions, 3);
    assert_eq!(state.global_pack.remaining_actions, 997);
    assert_eq!(state.daily_quota.used_today, 3);
    assert_eq!(state.account(&AccountId::new("a")).unwrap().actions_used, 2);
    assert_eq!(state.account(&AccountId::new("b")).unwrap().actions_used, 1);

    // Idempotent once counters agree with the log.
    assert!(!h.engine.repair_all_from_history().await.expect("repair"));
}

#[tokio::test]
async fn test_invalid_distribution_rejected() {
    let h = harness().await;

    let bad = Distribution {
        like: 50,
        retweet: 50,
        reply: 50,
    };
    let err = h
        .engine
        .set_daily_limit(100, Some(bad))
        .await
        .expect_err("shares summing past 100 must be rejected");
    assert!(err.to_string().contains("100"));
}

#[tokio::test]
async fn test_stats_snapshot_reflects_usage() {
    let h = harness().await;
    connect(&h.engine, "a").await;
    connect(&h.engine, "b").await;
    h.engine
        .remove_connected_account(&AccountId::new("b"))
        .await
        .expect("disconnect");
    h.engine
        .consume(&AccountId::new("a"), ActionType::Like, &TweetId::new("t1"))
        .await
        .expect("consume");

    let stats = h.engine.stats().await;
    assert_eq!(stats.active_accounts, 1);
    assert_eq!(stats.accounts.len(), 2);
    assert_eq!(stats.global_pack.used_actions, 1);

    let a = stats
        .accounts
        .iter()
        .find(|s| s.id == AccountId::new("a"))
        .expect("account a");
    assert_eq!(a.daily_total, 1);
    assert!(a.is_active);
}
