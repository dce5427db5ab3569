//! # engagehub-quota
//!
//! The quota core: fair allocation of the shared action pack across
//! connected accounts, read-only admission control, the atomic consumption
//! ledger, lazy daily resets, membership lifecycle, and drift repair from
//! the action history.

pub mod admission;
pub mod allocation;
pub mod drift;
pub mod engine;

pub use admission::{AdmissionDecision, DenialReason};
pub use drift::UsageTotals;
pub use engine::{AccountStats, ConsumeOutcome, QuotaEngine, ReconcileSummary, StatsSnapshot};
