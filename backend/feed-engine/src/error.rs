use crate::services::search::SearchError;
use crate::services::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("content search failed: {0}")]
    Search(#[from] SearchError),

    #[error("feed state storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("feed state serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
