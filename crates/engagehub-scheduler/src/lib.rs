//! # engagehub-scheduler
//!
//! The automation side of EngageHub: the periodic scan over candidate
//! content, probabilistic action-type selection, randomized pacing delays,
//! the scan guard with its recovery watchdog, the smart-scheduling planner,
//! and the long-running loops that drive it all.

pub mod delay;
pub mod guard;
pub mod planner;
pub mod runner;
pub mod scan;
pub mod selection;
pub mod watchdog;

pub use delay::DelayPolicy;
pub use guard::{ScanGuard, ScanStatus};
pub use planner::ActionPlanner;
pub use runner::{DispatchLoop, ReconcileLoop, ScanScheduler};
pub use scan::{ScanRunner, ScanSummary};
pub use selection::ActionSelector;
pub use watchdog::ScanWatchdog;
