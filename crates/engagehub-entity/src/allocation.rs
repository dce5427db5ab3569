//! Derived per-account allocation of the shared budgets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engagehub_core::types::action::{ActionType, Distribution};

/// Cached per-account share of the global and daily budgets.
///
/// Recomputed only when the set of active accounts changes (or on pack
/// re-purchase), never per action — per-action recalculation would make
/// quotas drift backward for existing accounts as others consume. Between
/// recalculations this is deliberately a stale cache so admission checks
/// stay O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Floor share of the remaining global pack per active account.
    pub per_account_quota: u64,
    /// Floor share of the daily limit per active account.
    pub per_account_daily: u64,
    /// When this allocation was computed.
    pub last_recalculation: DateTime<Utc>,
}

impl Allocation {
    /// An allocation with zero shares (no active accounts).
    pub fn zero(now: DateTime<Utc>) -> Self {
        Self {
            per_account_quota: 0,
            per_account_daily: 0,
            last_recalculation: now,
        }
    }

    /// The per-type daily sub-quota: `floor(per_account_daily * share / 100)`.
    pub fn per_type_daily_quota(&self, distribution: &Distribution, action: ActionType) -> u64 {
        self.per_account_daily * u64::from(distribution.share(action)) / 100
    }
}
