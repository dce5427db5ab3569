//! # engagehub-entity
//!
//! Domain entity models for EngageHub: the global action pack, the daily
//! quota, connected accounts, the derived allocation, scheduled actions,
//! history records, and the persisted root state record.

pub mod account;
pub mod allocation;
pub mod daily;
pub mod history;
pub mod pack;
pub mod scheduled;
pub mod state;

pub use account::{ConnectedAccount, DailyUsage};
pub use allocation::Allocation;
pub use daily::DailyQuota;
pub use history::ActionRecord;
pub use pack::{GlobalPack, PackType};
pub use scheduled::ScheduledAction;
pub use state::QuotaState;
