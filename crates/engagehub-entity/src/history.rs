//! Append-only action history record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engagehub_core::types::action::ActionType;
use engagehub_core::types::id::{AccountId, TweetId};

/// One performed action, as recorded in the append-only history log.
///
/// The history log is the audit source for drift correction: replaying it
/// rebuilds `actions_used` and `daily_used` from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Content the action targeted.
    pub tweet_id: TweetId,
    /// Account that performed the action.
    pub account_id: AccountId,
    /// Action type performed.
    pub action: ActionType,
    /// When the action was recorded.
    pub timestamp: DateTime<Utc>,
}
