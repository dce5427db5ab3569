//! External platform API client configuration.

use serde::{Deserialize, Serialize};

/// Settings for the opaque platform API client and the connection snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform API gateway.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds. A timed-out action is treated as
    /// failed and never consumes quota.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Path of the connected-account snapshot exported by the auth subsystem.
    #[serde(default = "default_connections_file")]
    pub connections_file: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            connections_file: default_connections_file(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8380".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connections_file() -> String {
    "data/connections.json".to_string()
}
