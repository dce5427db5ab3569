//! Connected account entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engagehub_core::types::action::ActionType;
use engagehub_core::types::auth::AuthMethod;

/// Today's per-type action counts for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Likes performed today.
    pub like: u64,
    /// Retweets performed today.
    pub retweet: u64,
    /// Replies performed today.
    pub reply: u64,
}

impl DailyUsage {
    /// Today's count for one action type.
    pub fn get(&self, action: ActionType) -> u64 {
        match action {
            ActionType::Like => self.like,
            ActionType::Retweet => self.retweet,
            ActionType::Reply => self.reply,
        }
    }

    /// Record one action of the given type.
    pub fn increment(&mut self, action: ActionType) {
        match action {
            ActionType::Like => self.like += 1,
            ActionType::Retweet => self.retweet += 1,
            ActionType::Reply => self.reply += 1,
        }
    }

    /// Total actions today across all types.
    pub fn total(&self) -> u64 {
        self.like + self.retweet + self.reply
    }

    /// Zero all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One managed platform identity.
///
/// Accounts are soft-deactivated on disconnect, never deleted, so historical
/// usage stays attributable across reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    /// Platform username at connection time.
    pub username: String,
    /// Authentication method used to connect.
    pub auth_method: AuthMethod,
    /// Whether the account is currently connected.
    pub is_active: bool,
    /// Cumulative actions consumed against the current global pack.
    pub actions_used: u64,
    /// Today's per-type counts.
    pub daily_used: DailyUsage,
    /// First successful connection time.
    pub connected_at: DateTime<Utc>,
    /// Most recent disconnect time, if any.
    pub disconnected_at: Option<DateTime<Utc>>,
    /// Most recent reconnect time, if any.
    pub reconnected_at: Option<DateTime<Utc>>,
}

impl ConnectedAccount {
    /// Create a freshly connected account with zeroed counters.
    pub fn new(username: impl Into<String>, auth_method: AuthMethod, now: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            auth_method,
            is_active: true,
            actions_used: 0,
            daily_used: DailyUsage::default(),
            connected_at: now,
            disconnected_at: None,
            reconnected_at: None,
        }
    }

    /// Soft-deactivate on disconnect.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.disconnected_at = Some(now);
    }

    /// Reactivate on reconnect, keeping all usage counters.
    pub fn reactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.reconnected_at = Some(now);
    }
}
