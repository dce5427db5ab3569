//! Scan and dispatch behavior over mocked platform collaborators.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use engagehub_core::config::quota::QuotaConfig;
use engagehub_core::config::scheduler::{DelayConfig, DelayRange, SelectionProbabilities};
use engagehub_core::result::AppResult;
use engagehub_core::traits::clock::ManualClock;
use engagehub_core::traits::connections::ConnectionProvider;
use engagehub_core::traits::content::{CandidateTweet, ContentSource};
use engagehub_core::traits::platform::{ActionOutcome, PlatformClient};
use engagehub_core::types::action::ActionType;
use engagehub_core::types::auth::{AccountCredentials, AuthMethod, ConnectedIdentity};
use engagehub_core::types::id::{AccountId, TweetId};
use engagehub_quota::QuotaEngine;
use engagehub_scheduler::{ActionPlanner, ActionSelector, DelayPolicy, ScanGuard, ScanRunner};
use engagehub_store::history::MemoryHistory;
use engagehub_store::memory::MemoryStateStore;

#[derive(Debug)]
struct MockPlatform {
    succeed: bool,
    calls: Mutex<Vec<(ActionType, TweetId)>>,
}

impl MockPlatform {
    fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn perform_action(
        &self,
        _credentials: &AccountCredentials,
        action: ActionType,
        target: &TweetId,
    ) -> AppResult<ActionOutcome> {
        self.calls.lock().unwrap().push((action, target.clone()));
        if self.succeed {
            Ok(ActionOutcome::ok())
        } else {
            Ok(ActionOutcome::failed("503"))
        }
    }
}

#[derive(Debug)]
struct StaticContent(Vec<CandidateTweet>);

#[async_trait]
impl ContentSource for StaticContent {
    async fn fetch_candidates(&self) -> AppResult<Vec<CandidateTweet>> {
        Ok(self.0.clone())
    }
}

#[derive(Debug)]
struct StaticConnections(Vec<ConnectedIdentity>);

#[async_trait]
impl ConnectionProvider for StaticConnections {
    async fn connected_identities(&self) -> AppResult<Vec<ConnectedIdentity>> {
        Ok(self.0.clone())
    }

    async fn credentials_for(&self, account_id: &AccountId) -> AppResult<AccountCredentials> {
        self.0
            .iter()
            .find(|i| i.id == *account_id)
            .map(|_| AccountCredentials {
                auth_method: AuthMethod::OAuth2,
                access_token: "tok".to_string(),
                access_secret: None,
            })
            .ok_or_else(|| {
                engagehub_core::error::AppError::not_found(format!(
                    "Account '{account_id}' is not connected"
                ))
            })
    }
}

fn candidate(id: &str) -> CandidateTweet {
    CandidateTweet {
        id: TweetId::new(id),
        author: Some("author".to_string()),
        text: Some("text".to_string()),
    }
}

fn identity(id: &str) -> ConnectedIdentity {
    ConnectedIdentity {
        id: AccountId::new(id),
        username: format!("user-{id}"),
        auth_method: AuthMethod::OAuth2,
    }
}

/// Replies only, so the number of attempts is deterministic.
fn replies_only() -> ActionSelector {
    ActionSelector::new(SelectionProbabilities {
        reply: 1.0,
        like: 0.0,
        retweet: 0.0,
    })
}

fn no_delays() -> DelayPolicy {
    let zero = DelayRange {
        min_ms: 0,
        max_ms: 0,
    };
    DelayPolicy::new(DelayConfig {
        like: zero,
        retweet: zero,
        reply: zero,
        between_accounts: zero,
    })
}

async fn engine_with_accounts(accounts: &[&str]) -> Arc<QuotaEngine> {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 13, 0, 0).unwrap(),
    ));
    let engine = QuotaEngine::open(
        Arc::new(MemoryStateStore::new()),
        Arc::new(MemoryHistory::new()),
        clock,
        &QuotaConfig::default(),
    )
    .await
    .expect("open engine");
    for id in accounts {
        engine
            .add_connected_account(&identity(id))
            .await
            .expect("connect");
    }
    Arc::new(engine)
}

fn runner(
    engine: Arc<QuotaEngine>,
    platform: Arc<MockPlatform>,
    candidates: Vec<CandidateTweet>,
    connections: Arc<StaticConnections>,
    guard: Arc<ScanGuard>,
    planner: Option<Arc<ActionPlanner>>,
) -> ScanRunner {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 13, 0, 0).unwrap(),
    ));
    ScanRunner::new(
        engine,
        platform,
        Arc::new(StaticContent(candidates)),
        connections,
        guard,
        clock,
        replies_only(),
        no_delays(),
        planner,
    )
}

#[tokio::test]
async fn test_successful_scan_performs_and_consumes() {
    let engine = engine_with_accounts(&["a"]).await;
    let platform = Arc::new(MockPlatform::new(true));
    let connections = Arc::new(StaticConnections(vec![identity("a")]));
    let runner = runner(
        engine.clone(),
        platform.clone(),
        vec![candidate("t1"), candidate("t2")],
        connections,
        Arc::new(ScanGuard::new()),
        None,
    );

    let summary = runner.run_cycle().await.expect("cycle").expect("ran");
    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.performed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(platform.call_count(), 2);

    let state = engine.snapshot().await;
    assert_eq!(state.global_pack.used_actions, 2);
    assert_eq!(state.daily_quota.used_today, 2);
    assert_eq!(
        state.account(&AccountId::new("a")).unwrap().daily_used.reply,
        2
    );
}

#[tokio::test]
async fn test_failed_platform_call_consumes_nothing() {
    let engine = engine_with_accounts(&["a"]).await;
    let platform = Arc::new(MockPlatform::new(false));
    let connections = Arc::new(StaticConnections(vec![identity("a")]));
    let runner = runner(
        engine.clone(),
        platform.clone(),
        vec![candidate("t1")],
        connections,
        Arc::new(ScanGuard::new()),
        None,
    );

    let summary = runner.run_cycle().await.expect("cycle").expect("ran");
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.performed, 0);
    assert_eq!(platform.call_count(), 1);

    // The platform was reached but reported failure; quota untouched.
    let state = engine.snapshot().await;
    assert_eq!(state.global_pack.used_actions, 0);
    assert_eq!(state.daily_quota.used_today, 0);
}

#[tokio::test]
async fn test_busy_guard_skips_cycle() {
    let engine = engine_with_accounts(&["a"]).await;
    let platform = Arc::new(MockPlatform::new(true));
    let connections = Arc::new(StaticConnections(vec![identity("a")]));
    let guard = Arc::new(ScanGuard::new());
    assert!(guard.try_begin(Utc::now()));

    let runner = runner(
        engine,
        platform.clone(),
        vec![candidate("t1")],
        connections,
        guard.clone(),
        None,
    );

    assert!(runner.run_cycle().await.expect("cycle").is_none());
    assert_eq!(platform.call_count(), 0);

    // Once the other scan finishes, cycles run again.
    guard.finish();
    assert!(runner.run_cycle().await.expect("cycle").is_some());
}

#[tokio::test]
async fn test_denied_attempts_do_not_reach_platform() {
    let engine = engine_with_accounts(&["a"]).await;
    // Exhaust the account's reply sub-quota up front.
    {
        let a = AccountId::new("a");
        // daily 100, 1 account → per-account daily 100, reply share 45%.
        for i in 0..45 {
            let outcome = engine
                .consume(&a, ActionType::Reply, &TweetId::new(format!("seed{i}")))
                .await
                .expect("consume");
            assert!(outcome.is_recorded());
        }
    }

    let platform = Arc::new(MockPlatform::new(true));
    let connections = Arc::new(StaticConnections(vec![identity("a")]));
    let runner = runner(
        engine,
        platform.clone(),
        vec![candidate("t1")],
        connections,
        Arc::new(ScanGuard::new()),
        None,
    );

    let summary = runner.run_cycle().await.expect("cycle").expect("ran");
    assert_eq!(summary.denied, 1);
    assert_eq!(summary.performed, 0);
    assert_eq!(platform.call_count(), 0);
}

#[tokio::test]
async fn test_dispatch_performs_due_deferred_actions() {
    let engine = engine_with_accounts(&["a"]).await;
    let platform = Arc::new(MockPlatform::new(true));
    let connections = Arc::new(StaticConnections(vec![identity("a")]));
    // Defer inside a peak window, then jump past the jitter ceiling.
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 13, 0, 0).unwrap(),
    ));
    let planner = Arc::new(ActionPlanner::new(clock.clone()));
    planner
        .defer(AccountId::new("a"), TweetId::new("t1"), ActionType::Reply)
        .await;
    clock.advance(chrono::Duration::minutes(20));

    let dispatch = engagehub_scheduler::DispatchLoop::new(
        planner.clone(),
        engine.clone(),
        connections,
        platform.clone(),
        clock,
        no_delays(),
        &engagehub_core::config::scheduler::SchedulerConfig::default(),
    );

    assert_eq!(dispatch.dispatch_due().await, 1);
    assert_eq!(platform.call_count(), 1);
    assert_eq!(planner.pending().await, 0);

    let state = engine.snapshot().await;
    assert_eq!(state.global_pack.used_actions, 1);
}

#[tokio::test]
async fn test_smart_scheduling_defers_instead_of_performing() {
    let engine = engine_with_accounts(&["a"]).await;
    let platform = Arc::new(MockPlatform::new(true));
    let connections = Arc::new(StaticConnections(vec![identity("a")]));
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 13, 0, 0).unwrap(),
    ));
    let planner = Arc::new(ActionPlanner::new(clock));

    let runner = runner(
        engine.clone(),
        platform.clone(),
        vec![candidate("t1")],
        connections,
        Arc::new(ScanGuard::new()),
        Some(planner.clone()),
    );

    let summary = runner.run_cycle().await.expect("cycle").expect("ran");
    assert_eq!(summary.deferred, 1);
    assert_eq!(summary.performed, 0);
    assert_eq!(platform.call_count(), 0);
    assert_eq!(planner.pending().await, 1);

    // Deferral has not consumed any quota.
    let state = engine.snapshot().await;
    assert_eq!(state.global_pack.used_actions, 0);
}
