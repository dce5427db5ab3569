//! Allocation engine: divides the shared budgets among active accounts.

use chrono::{DateTime, Utc};

use engagehub_entity::allocation::Allocation;

/// Recompute the per-account allocation with integer floor division.
///
/// With zero active accounts both shares are zero (no division by zero).
/// Budget units left over by the floor division stay in the pool,
/// unreachable until a future recalculation with a different account
/// count — accepted slack, not a bug.
pub fn recalculate(
    remaining_actions: u64,
    daily_limit: u64,
    active_accounts: u64,
    now: DateTime<Utc>,
) -> Allocation {
    if active_accounts == 0 {
        return Allocation::zero(now);
    }

    Allocation {
        per_account_quota: remaining_actions / active_accounts,
        per_account_daily: daily_limit / active_accounts,
        last_recalculation: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        // 1000 remaining, daily 100, 2 accounts → 500 / 50.
        let allocation = recalculate(1000, 100, 2, Utc::now());
        assert_eq!(allocation.per_account_quota, 500);
        assert_eq!(allocation.per_account_daily, 50);
    }

    #[test]
    fn test_survivor_inherits_full_remainder() {
        // Two accounts down to one with 600 actions left: the survivor's
        // share becomes the whole remainder.
        let allocation = recalculate(600, 100, 1, Utc::now());
        assert_eq!(allocation.per_account_quota, 600);
        assert_eq!(allocation.per_account_daily, 100);
    }

    #[test]
    fn test_zero_accounts_yields_zero_shares() {
        let allocation = recalculate(1000, 100, 0, Utc::now());
        assert_eq!(allocation.per_account_quota, 0);
        assert_eq!(allocation.per_account_daily, 0);
    }

    #[test]
    fn test_floor_division_leaves_slack() {
        let allocation = recalculate(1000, 100, 3, Utc::now());
        assert_eq!(allocation.per_account_quota, 333);
        assert_eq!(allocation.per_account_daily, 33);
        // 1 unit of pack budget and 1 daily unit stay unallocated.
    }

    #[test]
    fn test_adding_account_never_raises_existing_share() {
        let before = recalculate(900, 100, 3, Utc::now());
        let after = recalculate(900, 100, 4, Utc::now());
        assert!(after.per_account_quota <= before.per_account_quota);
        assert_eq!(after.per_account_quota, 225);
    }
}
