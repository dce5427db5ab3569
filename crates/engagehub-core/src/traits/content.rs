//! Candidate content discovery seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::TweetId;

/// One piece of content the scheduler may engage with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTweet {
    /// Opaque content identifier.
    pub id: TweetId,
    /// Author username, when the source reports it.
    pub author: Option<String>,
    /// Content text, when the source reports it.
    pub text: Option<String>,
}

/// Supplies candidate content items for a scan cycle.
#[async_trait]
pub trait ContentSource: Send + Sync + std::fmt::Debug {
    /// Fetch the current batch of candidate content.
    async fn fetch_candidates(&self) -> AppResult<Vec<CandidateTweet>>;
}
