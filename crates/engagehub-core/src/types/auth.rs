//! Authentication descriptors supplied by the external OAuth subsystem.
//!
//! EngageHub never performs token exchange itself; it only carries the
//! credentials the auth subsystem hands over and forwards them to the
//! platform API client.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::AccountId;

/// Authentication method used when the account was connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    /// Three-legged OAuth 1.0a (consumer + access token/secret pair).
    #[serde(rename = "oauth1a")]
    OAuth1a,
    /// OAuth 2.0 with PKCE (bearer access token).
    #[serde(rename = "oauth2")]
    OAuth2,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth1a => write!(f, "oauth1a"),
            Self::OAuth2 => write!(f, "oauth2"),
        }
    }
}

/// Per-account credentials forwarded to the platform API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCredentials {
    /// Authentication method the tokens belong to.
    pub auth_method: AuthMethod,
    /// Access token (bearer token for OAuth2).
    pub access_token: String,
    /// Access token secret (OAuth 1.0a only).
    pub access_secret: Option<String>,
}

/// One entry of the authoritative connected-account snapshot.
///
/// The auth subsystem owns connection state; this record is what it reports
/// for a currently connected account and is the input to reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedIdentity {
    /// Opaque platform account identifier.
    pub id: AccountId,
    /// Platform username at connection time.
    pub username: String,
    /// Authentication method used to connect.
    pub auth_method: AuthMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_serde_names() {
        let json = serde_json::to_string(&AuthMethod::OAuth1a).expect("serialize");
        assert_eq!(json, "\"oauth1a\"");
        let parsed: AuthMethod = serde_json::from_str("\"oauth2\"").expect("deserialize");
        assert_eq!(parsed, AuthMethod::OAuth2);
    }
}
