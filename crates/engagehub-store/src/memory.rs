//! In-memory state store for tests and single-process experiments.

use async_trait::async_trait;
use tokio::sync::Mutex;

use engagehub_core::result::AppResult;
use engagehub_entity::state::QuotaState;

use crate::state::StateStore;

/// State store that keeps the last saved record in memory.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    /// Last saved state, if any.
    state: Mutex<Option<QuotaState>>,
}

impl MemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a state record.
    pub fn with_state(state: QuotaState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// The last saved state, for assertions.
    pub async fn saved(&self) -> Option<QuotaState> {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> AppResult<Option<QuotaState>> {
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &QuotaState) -> AppResult<()> {
        *self.state.lock().await = Some(state.clone());
        Ok(())
    }
}
