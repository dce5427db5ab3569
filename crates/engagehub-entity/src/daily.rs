//! Daily quota entity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use engagehub_core::types::action::Distribution;

/// A rolling daily action ceiling, independent of the global pack.
///
/// `used_today` resets lazily on the first access after a UTC date
/// rollover — there is no background timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuota {
    /// Maximum actions per calendar day across all accounts.
    pub daily_limit: u64,
    /// Actions consumed today across all accounts.
    pub used_today: u64,
    /// Date the daily counters were last zeroed.
    pub last_reset: NaiveDate,
    /// Per-type percentage split of the daily budget.
    pub distribution: Distribution,
}

impl DailyQuota {
    /// Create a quota with zero usage, last reset today.
    pub fn new(daily_limit: u64, distribution: Distribution, today: NaiveDate) -> Self {
        Self {
            daily_limit,
            used_today: 0,
            last_reset: today,
            distribution,
        }
    }

    /// Whether the counters belong to an earlier date than `today`.
    pub fn needs_reset(&self, today: NaiveDate) -> bool {
        self.last_reset < today
    }

    /// Zero today's usage and stamp the reset date.
    pub fn reset_for(&mut self, today: NaiveDate) {
        self.used_today = 0;
        self.last_reset = today;
    }

    /// Actions still available today.
    pub fn remaining_today(&self) -> u64 {
        self.daily_limit.saturating_sub(self.used_today)
    }
}
