//! # engagehub-store
//!
//! Persistence backends for the quota state record and the append-only
//! action history log. The JSON implementations are the production path;
//! the in-memory implementations back tests.

pub mod history;
pub mod json;
pub mod memory;
pub mod state;

pub use history::{ActionHistory, JsonlHistoryLog, MemoryHistory};
pub use json::JsonStateStore;
pub use memory::MemoryStateStore;
pub use state::StateStore;
