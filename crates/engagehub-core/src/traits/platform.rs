//! Opaque platform API client seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::action::ActionType;
use crate::types::auth::AccountCredentials;
use crate::types::id::TweetId;

/// Result of one attempted platform action.
///
/// The quota core never inspects platform-specific error semantics beyond
/// success/failure; `error_code` exists only for operator-facing logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Whether the platform reported the action as performed.
    pub success: bool,
    /// Opaque error code on failure (HTTP status, platform error id, ...).
    pub error_code: Option<String>,
}

impl ActionOutcome {
    /// A successful outcome.
    pub fn ok() -> Self {
        Self {
            success: true,
            error_code: None,
        }
    }

    /// A failed outcome with an opaque error code.
    pub fn failed(error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: Some(error_code.into()),
        }
    }
}

/// Client that performs engagement actions against the external platform.
///
/// Implementations carry their own request timeout. A timeout or transport
/// error is reported as `Err`; callers treat it exactly like a failed
/// outcome — the action was not performed and must not consume quota.
#[async_trait]
pub trait PlatformClient: Send + Sync + std::fmt::Debug {
    /// Perform one action on behalf of the given credentials.
    async fn perform_action(
        &self,
        credentials: &AccountCredentials,
        action: ActionType,
        target: &TweetId,
    ) -> AppResult<ActionOutcome>;
}
