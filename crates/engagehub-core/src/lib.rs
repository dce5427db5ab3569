//! # engagehub-core
//!
//! Core crate for EngageHub. Contains configuration schemas, typed
//! identifiers, the action-type and distribution primitives, trait seams
//! toward external collaborators, and the unified error system.
//!
//! This crate has **no** internal dependencies on other EngageHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
