//! HTTP client for the platform API gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use engagehub_core::config::platform::PlatformConfig;
use engagehub_core::error::{AppError, ErrorKind};
use engagehub_core::result::AppResult;
use engagehub_core::traits::platform::{ActionOutcome, PlatformClient};
use engagehub_core::types::action::ActionType;
use engagehub_core::types::auth::AccountCredentials;
use engagehub_core::types::id::TweetId;

/// Request body for one engagement action.
#[derive(Debug, Serialize)]
struct ActionRequest<'a> {
    /// Target content identifier.
    tweet_id: &'a TweetId,
    /// Auth method the forwarded token belongs to.
    auth_method: &'a str,
    /// OAuth 1.0a token secret, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    access_secret: Option<&'a str>,
}

/// Platform API client over the HTTP gateway.
///
/// The gateway performs the platform-specific signing; this client only
/// forwards the credentials it was handed. A non-2xx response is a failed
/// outcome with the status as the opaque error code; timeouts and transport
/// errors surface as `Err` so callers can tell "platform said no" apart
/// from "never reached the platform".
#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    /// Shared reqwest client with the configured timeout.
    http: reqwest::Client,
    /// Gateway base URL, without trailing slash.
    base_url: String,
}

impl HttpPlatformClient {
    /// Build a client from configuration.
    pub fn new(config: &PlatformConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build platform HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn action_url(&self, action: ActionType) -> String {
        format!("{}/actions/{}", self.base_url, action.as_str())
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn perform_action(
        &self,
        credentials: &AccountCredentials,
        action: ActionType,
        target: &TweetId,
    ) -> AppResult<ActionOutcome> {
        let body = ActionRequest {
            tweet_id: target,
            auth_method: match credentials.auth_method {
                engagehub_core::types::auth::AuthMethod::OAuth1a => "oauth1a",
                engagehub_core::types::auth::AuthMethod::OAuth2 => "oauth2",
            },
            access_secret: credentials.access_secret.as_deref(),
        };

        let response = self
            .http
            .post(self.action_url(action))
            .bearer_auth(&credentials.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Platform request for '{action}' failed"),
                    e,
                )
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%action, tweet = %target, "Platform action performed");
            Ok(ActionOutcome::ok())
        } else {
            debug!(%action, tweet = %target, %status, "Platform rejected action");
            Ok(ActionOutcome::failed(status.as_str()))
        }
    }
}
