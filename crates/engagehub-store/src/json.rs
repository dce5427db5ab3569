//! JSON file state store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, warn};

use engagehub_core::error::AppError;
use engagehub_core::result::AppResult;
use engagehub_entity::state::{QuotaState, SCHEMA_VERSION};

use crate::state::StateStore;

/// State store backed by a single pretty-printed JSON file.
///
/// Writes go through a temp file followed by a rename so a crash mid-write
/// never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    /// Path of the state file.
    path: PathBuf,
}

impl JsonStateStore {
    /// Create a store over the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> AppResult<Option<QuotaState>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    engagehub_core::error::ErrorKind::Storage,
                    format!("Failed to read state file '{}': {e}", self.path.display()),
                    e,
                ));
            }
        };

        match serde_json::from_slice::<QuotaState>(&bytes) {
            Ok(state) => {
                if state.schema_version != SCHEMA_VERSION {
                    warn!(
                        found = state.schema_version,
                        expected = SCHEMA_VERSION,
                        "State file has unexpected schema version"
                    );
                }
                Ok(Some(state))
            }
            Err(e) => {
                // Corrupt state falls back to a fresh default; losing drifted
                // counters beats refusing to start.
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "State file is corrupt, falling back to defaults"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &QuotaState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}
