//! State store trait.

use async_trait::async_trait;

use engagehub_core::result::AppResult;
use engagehub_entity::state::QuotaState;

/// Durable storage for the single quota state record.
///
/// `save` must be synchronous with respect to the caller: when it returns
/// `Ok`, the state is durable, so a crash after a successful consumption
/// never loses the decrement.
#[async_trait]
pub trait StateStore: Send + Sync + std::fmt::Debug {
    /// Load the persisted state.
    ///
    /// Returns `Ok(None)` when no state exists yet *or* when the persisted
    /// record is unreadable — corruption is logged and falls back to a
    /// fresh default rather than failing startup.
    async fn load(&self) -> AppResult<Option<QuotaState>>;

    /// Persist the full state record.
    async fn save(&self, state: &QuotaState) -> AppResult<()>;
}
