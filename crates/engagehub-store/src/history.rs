//! Append-only action history log.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use engagehub_core::result::AppResult;
use engagehub_core::types::id::AccountId;
use engagehub_entity::history::ActionRecord;

/// Append-only record of every performed action.
///
/// An external recalculation utility (and the built-in drift repair) can
/// replay this log to rebuild usage counters from scratch.
#[async_trait]
pub trait ActionHistory: Send + Sync + std::fmt::Debug {
    /// Append one performed action.
    async fn append(&self, record: &ActionRecord) -> AppResult<()>;

    /// Replay the log, optionally filtered to one account.
    async fn replay(&self, account_id: Option<&AccountId>) -> AppResult<Vec<ActionRecord>>;
}

/// History log stored as one JSON record per line.
#[derive(Debug, Clone)]
pub struct JsonlHistoryLog {
    /// Path of the log file.
    path: PathBuf,
}

impl JsonlHistoryLog {
    /// Create a log over the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ActionHistory for JsonlHistoryLog {
    async fn append(&self, record: &ActionRecord) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    async fn replay(&self, account_id: Option<&AccountId>) -> AppResult<Vec<ActionRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ActionRecord>(line) {
                Ok(record) => {
                    if account_id.is_none_or(|id| record.account_id == *id) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    // A torn trailing line from a crash is expected; anything
                    // else is still only an audit gap, not a fatal error.
                    warn!(
                        path = %self.path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Skipping unparseable history line"
                    );
                }
            }
        }

        Ok(records)
    }
}

/// In-memory history for tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    /// Appended records, in order.
    records: Mutex<Vec<ActionRecord>>,
}

impl MemoryHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of appended records, for assertions.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether no records have been appended.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Push a record directly, bypassing the trait (test setup).
    pub async fn push(&self, record: ActionRecord) {
        self.records.lock().await.push(record);
    }
}

#[async_trait]
impl ActionHistory for MemoryHistory {
    async fn append(&self, record: &ActionRecord) -> AppResult<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn replay(&self, account_id: Option<&AccountId>) -> AppResult<Vec<ActionRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| account_id.is_none_or(|id| r.account_id == *id))
            .cloned()
            .collect())
    }
}
