//! Persistent state location configuration.

use serde::{Deserialize, Serialize};

/// File locations for the quota state record and the action history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON quota state file.
    #[serde(default = "default_state_file")]
    pub state_file: String,
    /// Path of the append-only JSONL action history log.
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            history_file: default_history_file(),
        }
    }
}

fn default_state_file() -> String {
    "data/quota/state.json".to_string()
}

fn default_history_file() -> String {
    "data/quota/history.jsonl".to_string()
}
