//! Candidate content discovery over the platform API gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use engagehub_core::config::platform::PlatformConfig;
use engagehub_core::error::{AppError, ErrorKind};
use engagehub_core::result::AppResult;
use engagehub_core::traits::content::{CandidateTweet, ContentSource};

/// Gateway response wrapper for the candidates endpoint.
#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    /// Current batch of candidate items.
    candidates: Vec<CandidateTweet>,
}

/// Content source backed by the gateway's `/candidates` endpoint.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    http: reqwest::Client,
    url: String,
}

impl HttpContentSource {
    /// Build a source from configuration.
    pub fn new(config: &PlatformConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build content source HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            http,
            url: format!("{}/candidates", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_candidates(&self) -> AppResult<Vec<CandidateTweet>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Candidate fetch request failed",
                    e,
                )
            })?
            .error_for_status()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Candidate fetch returned an error status",
                    e,
                )
            })?;

        let parsed: CandidatesResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Candidate fetch returned malformed JSON",
                e,
            )
        })?;

        debug!(count = parsed.candidates.len(), "Fetched candidate batch");
        Ok(parsed.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_response_parses() {
        let json = r#"{"candidates":[{"id":"t1","author":"alice","text":"hello"},{"id":"t2","author":null,"text":null}]}"#;
        let parsed: CandidatesResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed.candidates.len(), 2);
        assert_eq!(parsed.candidates[0].id.as_str(), "t1");
        assert!(parsed.candidates[1].author.is_none());
    }
}
