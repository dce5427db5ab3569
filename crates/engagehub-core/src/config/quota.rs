//! Global pack and daily quota configuration.

use serde::{Deserialize, Serialize};

use crate::types::action::Distribution;

/// Quota settings used to bootstrap a fresh store and as daily defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Rolling daily action ceiling shared by all accounts.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u64,
    /// Percentage split of the daily budget across action types.
    #[serde(default)]
    pub distribution: Distribution,
    /// Initial global pack, applied when no persisted state exists yet.
    #[serde(default)]
    pub pack: PackConfig,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            distribution: Distribution::default(),
            pack: PackConfig::default(),
        }
    }
}

/// Initial global pack configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    /// Total purchased actions.
    #[serde(default = "default_total_actions")]
    pub total_actions: u64,
    /// Pack tier: `"basic"`, `"premium"`, or `"enterprise"`.
    #[serde(default = "default_pack_type")]
    pub pack_type: String,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            total_actions: default_total_actions(),
            pack_type: default_pack_type(),
        }
    }
}

fn default_daily_limit() -> u64 {
    100
}

fn default_total_actions() -> u64 {
    1000
}

fn default_pack_type() -> String {
    "basic".to_string()
}
