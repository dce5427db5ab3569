//! Deferred action entity for smart scheduling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use engagehub_core::types::action::ActionType;
use engagehub_core::types::id::{AccountId, TweetId};

/// An action deferred to an engagement-optimal time window.
///
/// Only used when smart scheduling is enabled; otherwise actions execute
/// immediately during the scan. Removed from the planner queue once its
/// `scheduled_time` has passed and it is dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledAction {
    /// Unique identifier of the deferred action.
    pub id: Uuid,
    /// Account that will perform the action.
    pub account_id: AccountId,
    /// Content the action targets.
    pub tweet_id: TweetId,
    /// Action type to perform.
    pub action: ActionType,
    /// When the action becomes due.
    pub scheduled_time: DateTime<Utc>,
    /// Relative engagement value of the chosen window, 0.0 to 1.0.
    pub efficiency_score: f64,
    /// When the action was deferred.
    pub created_at: DateTime<Utc>,
}

impl ScheduledAction {
    /// Whether the action is due for dispatch.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_time <= now
    }
}
