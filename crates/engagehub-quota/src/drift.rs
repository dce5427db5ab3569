//! Drift repair: rebuild usage counters from the append-only action
//! history instead of trusting possibly-drifted stored counters.
//!
//! The history log is the ground truth for what was actually performed; the
//! counters in the state record are a cache of it. After a crash between a
//! counter update and a history append (or a hand-edited state file) the
//! two can disagree, and replaying the log resolves the disagreement in the
//! log's favor.

use chrono::{DateTime, NaiveDate, Utc};

use engagehub_core::result::AppResult;
use engagehub_core::types::id::AccountId;
use engagehub_entity::account::DailyUsage;
use engagehub_entity::history::ActionRecord;

use crate::engine::QuotaEngine;

/// Usage counters recomputed from the history log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    /// Actions within the current pack cycle.
    pub actions_used: u64,
    /// Per-type actions performed today.
    pub daily_used: DailyUsage,
}

/// Fold a replayed record slice into usage totals.
///
/// Records before `pack_purchase` belong to an earlier pack cycle and do
/// not count against `actions_used`; only records dated `today` count
/// against the daily totals.
pub fn recompute_totals(
    records: &[ActionRecord],
    pack_purchase: DateTime<Utc>,
    today: NaiveDate,
) -> UsageTotals {
    let mut totals = UsageTotals::default();

    for record in records {
        if record.timestamp >= pack_purchase {
            totals.actions_used += 1;
        }
        if record.timestamp.date_naive() == today {
            totals.daily_used.increment(record.action);
        }
    }

    totals
}

impl QuotaEngine {
    /// Rebuild one account's usage counters from the history log.
    ///
    /// Returns the recomputed totals; persists only when they differ from
    /// the stored counters.
    pub async fn repair_account(&self, account_id: &AccountId) -> AppResult<UsageTotals> {
        let records = self.history().replay(Some(account_id)).await?;
        let today = self.clock().today();

        let mut state = self.write_state().await;
        let totals = recompute_totals(&records, state.global_pack.purchase_date, today);

        let Some(account) = state.account_mut(account_id) else {
            return Ok(totals);
        };

        if account.actions_used != totals.actions_used || account.daily_used != totals.daily_used {
            tracing::warn!(
                account = %account_id,
                stored = account.actions_used,
                recomputed = totals.actions_used,
                "Repairing drifted usage counters from history"
            );
            account.actions_used = totals.actions_used;
            account.daily_used = totals.daily_used;
            self.persist(&state).await?;
        }

        Ok(totals)
    }

    /// Rebuild every account's counters and the shared pack/daily counters
    /// from a full history replay. Returns `true` when anything changed.
    pub async fn repair_all_from_history(&self) -> AppResult<bool> {
        let records = self.history().replay(None).await?;
        let today = self.clock().today();

        let mut state = self.write_state().await;
        let purchase = state.global_pack.purchase_date;
        let mut changed = false;

        let mut pack_used = 0u64;
        let mut daily_used = 0u64;
        for (id, account) in state.connected_accounts.iter_mut() {
            let own: Vec<ActionRecord> = records
                .iter()
                .filter(|r| r.account_id == *id)
                .cloned()
                .collect();
            let totals = recompute_totals(&own, purchase, today);
            pack_used += totals.actions_used;
            daily_used += totals.daily_used.total();

            if account.actions_used != totals.actions_used
                || account.daily_used != totals.daily_used
            {
                account.actions_used = totals.actions_used;
                account.daily_used = totals.daily_used;
                changed = true;
            }
        }

        if state.global_pack.used_actions != pack_used {
            state.global_pack.used_actions = pack_used;
            state.global_pack.validate_and_repair();
            changed = true;
        }
        if state.daily_quota.used_today != daily_used {
            state.daily_quota.used_today = daily_used;
            changed = true;
        }

        if changed {
            tracing::warn!(pack_used, daily_used, "Repaired quota counters from full history replay");
            self.persist(&state).await?;
        }

        Ok(changed)
    }
}
