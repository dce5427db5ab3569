//! The persisted root quota state record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engagehub_core::config::quota::QuotaConfig;
use engagehub_core::types::id::AccountId;

use crate::account::ConnectedAccount;
use crate::allocation::Allocation;
use crate::daily::DailyQuota;
use crate::pack::{GlobalPack, PackType};

/// Current schema version of the persisted state record.
pub const SCHEMA_VERSION: u32 = 1;

/// The single persisted record holding the entire quota state.
///
/// Strongly typed and schema-versioned; validated on load with soft
/// fallback to defaults rather than trusting shape at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaState {
    /// Schema version of this record.
    pub schema_version: u32,
    /// The shared purchased action budget.
    pub global_pack: GlobalPack,
    /// The shared rolling daily ceiling.
    pub daily_quota: DailyQuota,
    /// All accounts ever connected, keyed by platform account id.
    pub connected_accounts: BTreeMap<AccountId, ConnectedAccount>,
    /// Cached per-account allocation.
    pub allocation: Allocation,
}

impl QuotaState {
    /// Create an empty state with the given pack and daily settings.
    pub fn new(global_pack: GlobalPack, daily_quota: DailyQuota, now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            global_pack,
            daily_quota,
            connected_accounts: BTreeMap::new(),
            allocation: Allocation::zero(now),
        }
    }

    /// Seed a fresh state from configuration (first run, no persisted file).
    pub fn bootstrap(config: &QuotaConfig, now: DateTime<Utc>) -> Self {
        let pack_type = config.pack.pack_type.parse().unwrap_or(PackType::Basic);
        let pack = GlobalPack::new(config.pack.total_actions, pack_type, now, None);
        let daily = DailyQuota::new(config.daily_limit, config.distribution, now.date_naive());
        Self::new(pack, daily, now)
    }

    /// Number of currently active accounts.
    pub fn active_account_count(&self) -> usize {
        self.connected_accounts
            .values()
            .filter(|a| a.is_active)
            .count()
    }

    /// Iterator over `(id, account)` pairs of active accounts.
    pub fn active_accounts(&self) -> impl Iterator<Item = (&AccountId, &ConnectedAccount)> {
        self.connected_accounts
            .iter()
            .filter(|(_, a)| a.is_active)
    }

    /// Look up an account by id.
    pub fn account(&self, id: &AccountId) -> Option<&ConnectedAccount> {
        self.connected_accounts.get(id)
    }

    /// Mutable account lookup.
    pub fn account_mut(&mut self, id: &AccountId) -> Option<&mut ConnectedAccount> {
        self.connected_accounts.get_mut(id)
    }

    /// Validate invariants a loaded record must satisfy, repairing what can
    /// be repaired in place. Returns `true` when anything was changed.
    pub fn validate_and_repair(&mut self) -> bool {
        let mut repaired = self.global_pack.validate_and_repair();

        if self.daily_quota.distribution.validate().is_err() {
            self.daily_quota.distribution = Default::default();
            repaired = true;
        }

        repaired
    }
}

impl Default for QuotaState {
    fn default() -> Self {
        let now = Utc::now();
        let pack = GlobalPack::new(0, PackType::Basic, now, None);
        let daily = DailyQuota::new(100, Default::default(), now.date_naive());
        Self::new(pack, daily, now)
    }
}
