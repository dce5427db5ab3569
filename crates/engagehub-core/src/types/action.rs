//! Engagement action types and the per-type daily budget distribution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An engagement action performed against a piece of platform content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Like / favorite.
    Like,
    /// Retweet / repost.
    Retweet,
    /// Reply with generated or templated text.
    Reply,
}

impl ActionType {
    /// All action types, in the order the scheduler evaluates them.
    pub const ALL: [ActionType; 3] = [ActionType::Reply, ActionType::Like, ActionType::Retweet];

    /// Lowercase wire name of the action type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Retweet => "retweet",
            Self::Reply => "reply",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "retweet" => Ok(Self::Retweet),
            "reply" => Ok(Self::Reply),
            other => Err(AppError::validation(format!(
                "Unknown action type '{other}'"
            ))),
        }
    }
}

/// Percentage split of the per-account daily budget across action types.
///
/// The three percentages must sum to exactly 100. The per-type sub-quota is
/// `floor(per_account_daily * percentage / 100)`, recomputed on every
/// admission check rather than cached — it is two integer operations on a
/// snapshot already in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Percentage of the daily budget reserved for likes.
    #[serde(default = "default_like")]
    pub like: u32,
    /// Percentage of the daily budget reserved for retweets.
    #[serde(default = "default_retweet")]
    pub retweet: u32,
    /// Percentage of the daily budget reserved for replies.
    #[serde(default = "default_reply")]
    pub reply: u32,
}

impl Distribution {
    /// The percentage assigned to one action type.
    pub fn share(&self, action: ActionType) -> u32 {
        match action {
            ActionType::Like => self.like,
            ActionType::Retweet => self.retweet,
            ActionType::Reply => self.reply,
        }
    }

    /// Validate that the percentages sum to exactly 100.
    pub fn validate(&self) -> Result<(), AppError> {
        let total = self.like + self.retweet + self.reply;
        if total != 100 {
            return Err(AppError::validation(format!(
                "Distribution percentages must sum to 100, got {total}"
            )));
        }
        Ok(())
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            like: default_like(),
            retweet: default_retweet(),
            reply: default_reply(),
        }
    }
}

fn default_like() -> u32 {
    45
}

fn default_retweet() -> u32 {
    10
}

fn default_reply() -> u32 {
    45
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_wire_names() {
        assert_eq!(ActionType::Like.as_str(), "like");
        assert_eq!("retweet".parse::<ActionType>().expect("parse"), ActionType::Retweet);
        assert!("quote".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_default_distribution_is_valid() {
        let dist = Distribution::default();
        assert_eq!(dist.like, 45);
        assert_eq!(dist.retweet, 10);
        assert_eq!(dist.reply, 45);
        dist.validate().expect("default distribution sums to 100");
    }

    #[test]
    fn test_invalid_distribution_rejected() {
        let dist = Distribution {
            like: 50,
            retweet: 50,
            reply: 50,
        };
        assert!(dist.validate().is_err());
    }
}
