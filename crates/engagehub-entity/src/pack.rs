//! Global action pack entity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engagehub_core::error::AppError;

/// Purchased pack tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackType {
    /// Entry tier.
    Basic,
    /// Mid tier.
    Premium,
    /// Top tier.
    Enterprise,
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Premium => write!(f, "premium"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl FromStr for PackType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(AppError::validation(format!("Unknown pack type '{other}'"))),
        }
    }
}

/// The purchased action budget shared by all connected accounts.
///
/// Invariant: `remaining_actions == total_actions - used_actions`, never
/// negative. The stored `remaining_actions` mirrors the persisted layout;
/// [`GlobalPack::validate_and_repair`] re-derives it on load so a drifted
/// or hand-edited state file self-corrects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPack {
    /// Total purchased actions for this cycle. Immutable until re-purchase.
    pub total_actions: u64,
    /// Actions consumed this cycle. Monotonically non-decreasing.
    pub used_actions: u64,
    /// Actions still available this cycle.
    pub remaining_actions: u64,
    /// Purchased tier.
    pub pack_type: PackType,
    /// When this pack cycle started.
    pub purchase_date: DateTime<Utc>,
    /// Optional expiry of the pack cycle.
    pub expiry_date: Option<DateTime<Utc>>,
}

impl GlobalPack {
    /// Create a fresh, unused pack.
    pub fn new(
        total_actions: u64,
        pack_type: PackType,
        purchase_date: DateTime<Utc>,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            total_actions,
            used_actions: 0,
            remaining_actions: total_actions,
            pack_type,
            purchase_date,
            expiry_date,
        }
    }

    /// Whether no budget remains.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_actions == 0
    }

    /// Whether the pack cycle has expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| now >= expiry)
    }

    /// Record one consumed action against the pack.
    pub fn record_consumption(&mut self) {
        self.used_actions += 1;
        self.remaining_actions = self.remaining_actions.saturating_sub(1);
    }

    /// Re-purchase: reset the pack to a fresh cycle.
    pub fn reset(
        &mut self,
        total_actions: u64,
        pack_type: PackType,
        purchase_date: DateTime<Utc>,
        expiry_date: Option<DateTime<Utc>>,
    ) {
        *self = Self::new(total_actions, pack_type, purchase_date, expiry_date);
    }

    /// Re-derive `remaining_actions` from `total_actions - used_actions`.
    ///
    /// Returns `true` when a repair was needed.
    pub fn validate_and_repair(&mut self) -> bool {
        let expected = self.total_actions.saturating_sub(self.used_actions);
        if self.remaining_actions != expected {
            self.remaining_actions = expected;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(total: u64) -> GlobalPack {
        GlobalPack::new(total, PackType::Basic, Utc::now(), None)
    }

    #[test]
    fn test_consumption_keeps_invariant() {
        let mut pack = pack(3);
        for _ in 0..3 {
            pack.record_consumption();
            assert_eq!(
                pack.remaining_actions,
                pack.total_actions - pack.used_actions
            );
        }
        assert!(pack.is_exhausted());
    }

    #[test]
    fn test_validate_repairs_drifted_remaining() {
        let mut pack = pack(100);
        pack.used_actions = 40;
        pack.remaining_actions = 99;
        assert!(pack.validate_and_repair());
        assert_eq!(pack.remaining_actions, 60);
        assert!(!pack.validate_and_repair());
    }

    #[test]
    fn test_reset_starts_fresh_cycle() {
        let mut pack = pack(10);
        pack.record_consumption();
        pack.reset(500, PackType::Premium, Utc::now(), None);
        assert_eq!(pack.used_actions, 0);
        assert_eq!(pack.remaining_actions, 500);
        assert_eq!(pack.pack_type, PackType::Premium);
    }
}
