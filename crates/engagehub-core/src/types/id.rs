//! Newtype wrappers around opaque platform-issued string identifiers.
//!
//! Account and tweet identifiers come from the external platform and are
//! never parsed or interpreted — they are only compared and displayed.
//! Using distinct types prevents accidentally passing a `TweetId` where an
//! `AccountId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype wrapper around an opaque `String` identifier.
macro_rules! define_opaque_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_opaque_id!(
    /// Opaque external identifier of a connected platform account.
    AccountId
);

define_opaque_id!(
    /// Opaque external identifier of a piece of platform content.
    TweetId
);
