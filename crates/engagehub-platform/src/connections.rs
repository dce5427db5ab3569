//! File-based connected-account snapshot.
//!
//! The auth subsystem exports its current connections as a JSON file; this
//! provider re-reads the file on every call so reconciliation always sees
//! the freshest snapshot without any coordination channel.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use engagehub_core::error::{AppError, ErrorKind};
use engagehub_core::result::AppResult;
use engagehub_core::traits::connections::ConnectionProvider;
use engagehub_core::types::auth::{AccountCredentials, AuthMethod, ConnectedIdentity};
use engagehub_core::types::id::AccountId;

/// One exported connection entry.
#[derive(Debug, Clone, Deserialize)]
struct StoredConnection {
    /// Platform account id.
    id: AccountId,
    /// Platform username.
    username: String,
    /// Auth method of the stored tokens.
    auth_method: AuthMethod,
    /// Access token.
    access_token: String,
    /// Token secret (OAuth 1.0a only).
    #[serde(default)]
    access_secret: Option<String>,
}

/// Connection provider reading the auth subsystem's snapshot file.
#[derive(Debug, Clone)]
pub struct FileConnectionProvider {
    /// Path of the exported snapshot file.
    path: PathBuf,
}

impl FileConnectionProvider {
    /// Create a provider over the given snapshot path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_snapshot(&self) -> AppResult<Vec<StoredConnection>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            // No export yet means no connected accounts, not a failure.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!(
                        "Failed to read connections snapshot '{}'",
                        self.path.display()
                    ),
                    e,
                ));
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!(
                    "Malformed connections snapshot '{}'",
                    self.path.display()
                ),
                e,
            )
        })
    }
}

#[async_trait]
impl ConnectionProvider for FileConnectionProvider {
    async fn connected_identities(&self) -> AppResult<Vec<ConnectedIdentity>> {
        let snapshot = self.read_snapshot().await?;
        Ok(snapshot
            .into_iter()
            .map(|c| ConnectedIdentity {
                id: c.id,
                username: c.username,
                auth_method: c.auth_method,
            })
            .collect())
    }

    async fn credentials_for(&self, account_id: &AccountId) -> AppResult<AccountCredentials> {
        let snapshot = self.read_snapshot().await?;
        snapshot
            .into_iter()
            .find(|c| c.id == *account_id)
            .map(|c| AccountCredentials {
                auth_method: c.auth_method,
                access_token: c.access_token,
                access_secret: c.access_secret,
            })
            .ok_or_else(|| {
                AppError::not_found(format!("Account '{account_id}' is not connected"))
            })
    }
}
