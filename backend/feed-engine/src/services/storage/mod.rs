// ============================================
// Feed State Storage
// ============================================
//
// FeedState is persisted as one JSON record under a well-known key
// (default `feedState`). The store itself is an opaque key-value port;
// `StateRepository` owns the record format.

mod memory;
mod redis_store;

pub use memory::MemoryStateStore;
pub use redis_store::RedisStateStore;

use crate::error::Result;
use crate::models::FeedState;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Key-value store holding serialized records
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError>;

    /// Replace the value under `key` in a single write
    async fn put(&self, key: &str, value: String) -> std::result::Result<(), StorageError>;
}

/// Reads and writes the `FeedState` record
#[derive(Clone)]
pub struct StateRepository {
    store: Arc<dyn StateStore>,
    key: String,
}

impl StateRepository {
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn load(&self) -> Result<Option<FeedState>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        let state: FeedState = serde_json::from_str(&raw)?;
        debug!(
            key = %self.key,
            feed_len = state.feed.len(),
            interests = state.interests.len(),
            "Feed state loaded"
        );
        Ok(Some(state))
    }

    pub async fn save(&self, state: &FeedState) -> Result<()> {
        let raw = serde_json::to_string(state)?;
        self.store.put(&self.key, raw).await?;
        debug!(key = %self.key, feed_len = state.feed.len(), "Feed state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::models::{audio_type, FeedItem, ReelStage, UserProfile, VideoSummary};

    #[tokio::test]
    async fn test_repository_round_trip() {
        let store = Arc::new(MemoryStateStore::new());
        let repository = StateRepository::new(store.clone(), "feedState");

        assert!(repository.load().await.unwrap().is_none());

        let mut state = FeedState::new(UserProfile::new("hindi", "IN"));
        state.interests.add(audio_type::BGM, 2);
        state.interests.add(audio_type::DIALOGUE, 1);
        state.last_reel_type = Some(ReelStage::Soft);
        state.feed.push(FeedItem::new(
            VideoSummary {
                id: "v9".to_string(),
                title: "Mass entry".to_string(),
                channel: "Hype".to_string(),
                like_count: 50,
                comment_count: 3,
            },
            audio_type::BGM,
        ));

        repository.save(&state).await.unwrap();
        assert!(store.get("feedState").await.unwrap().is_some());

        let loaded = repository.load().await.unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(
            loaded.interests.ranked_categories(),
            vec![audio_type::BGM, audio_type::DIALOGUE]
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reported() {
        let store = Arc::new(MemoryStateStore::new());
        store.put("feedState", "{not json".to_string()).await.unwrap();

        let repository = StateRepository::new(store, "feedState");
        let err = repository.load().await.unwrap_err();
        assert!(matches!(err, FeedError::Serialization(_)));
    }
}
