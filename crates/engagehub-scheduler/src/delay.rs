//! Randomized pacing delays between actions and accounts.

use std::time::Duration;

use engagehub_core::config::scheduler::{DelayConfig, DelayRange};
use engagehub_core::types::action::ActionType;

/// Draws randomized cooperative delays from the configured ranges.
///
/// The delays pace platform traffic so bursts of automated actions do not
/// land back to back. All sleeps are `tokio::time::sleep` and therefore
/// cancel cleanly at shutdown.
#[derive(Debug, Clone)]
pub struct DelayPolicy {
    config: DelayConfig,
}

impl DelayPolicy {
    /// Create a policy over the configured ranges.
    pub fn new(config: DelayConfig) -> Self {
        Self { config }
    }

    fn range_for(&self, action: ActionType) -> DelayRange {
        match action {
            ActionType::Like => self.config.like,
            ActionType::Retweet => self.config.retweet,
            ActionType::Reply => self.config.reply,
        }
    }

    fn sample(range: DelayRange) -> Duration {
        let min = range.min_ms.min(range.max_ms);
        let max = range.min_ms.max(range.max_ms);
        let ms = if min == max {
            min
        } else {
            // ThreadRng is !Send; keep it scoped so callers can await the
            // returned duration freely.
            rand::Rng::random_range(&mut rand::rng(), min..=max)
        };
        Duration::from_millis(ms)
    }

    /// A randomized delay after one action of the given type.
    pub fn after_action(&self, action: ActionType) -> Duration {
        Self::sample(self.range_for(action))
    }

    /// A randomized delay between accounts within one candidate.
    pub fn between_accounts(&self) -> Duration {
        Self::sample(self.config.between_accounts)
    }

    /// Sleep for a randomized post-action delay.
    pub async fn pause_after(&self, action: ActionType) {
        tokio::time::sleep(self.after_action(action)).await;
    }

    /// Sleep for a randomized between-accounts delay.
    pub async fn pause_between_accounts(&self) {
        tokio::time::sleep(self.between_accounts()).await;
    }
}
