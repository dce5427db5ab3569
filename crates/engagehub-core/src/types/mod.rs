//! Shared domain primitives: action types, budget distribution, opaque
//! identifiers, and authentication descriptors.

pub mod action;
pub mod auth;
pub mod id;

pub use action::{ActionType, Distribution};
pub use auth::{AccountCredentials, AuthMethod, ConnectedIdentity};
pub use id::{AccountId, TweetId};
