//! Seam toward the external auth/connection subsystem.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::auth::{AccountCredentials, ConnectedIdentity};
use crate::types::id::AccountId;

/// Supplies the authoritative view of currently connected accounts.
///
/// Connection state is owned by the external OAuth layer and can drift from
/// the quota store's view; the reconciliation loop periodically corrects the
/// store against `connected_identities()`.
#[async_trait]
pub trait ConnectionProvider: Send + Sync + std::fmt::Debug {
    /// Snapshot of all currently connected accounts.
    async fn connected_identities(&self) -> AppResult<Vec<ConnectedIdentity>>;

    /// Credentials for one connected account.
    ///
    /// Returns a not-found error if the account is not currently connected.
    async fn credentials_for(&self, account_id: &AccountId) -> AppResult<AccountCredentials>;
}
