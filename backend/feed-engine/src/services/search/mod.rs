// ============================================
// Content Search Port
// ============================================
//
// The engine never talks to a video provider directly. Every query goes
// through `ContentSearchClient`: (query, region, count) in, ranked videos out.
// An empty list is a normal answer, not an error.

mod youtube;

#[cfg(test)]
pub(crate) mod testing;

pub use youtube::YouTubeSearchClient;

use crate::models::VideoSummary;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Search backend unavailable: {0}")]
    Unavailable(String),
}

/// Video search provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSearchClient: Send + Sync {
    /// Search for up to `count` short videos matching `query` in `region`.
    ///
    /// Every returned summary is complete; providers drop items they
    /// cannot fully populate.
    async fn search(
        &self,
        query: &str,
        region: &str,
        count: usize,
    ) -> Result<Vec<VideoSummary>, SearchError>;
}
