use super::{StateStore, StorageError};
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

/// Redis-backed store
///
/// Redis keys:
/// - {prefix}:{key} - serialized record (plain string, single SET)
pub struct RedisStateStore {
    redis: redis::Client,
    key_prefix: String,
}

impl RedisStateStore {
    pub fn new(redis: redis::Client) -> Self {
        Self {
            redis,
            key_prefix: "feed".to_string(),
        }
    }

    pub fn open(url: &str) -> Result<Self, StorageError> {
        Ok(Self::new(redis::Client::open(url)?))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let full_key = self.full_key(key);
        let _: () = conn.set(&full_key, value).await?;
        debug!(key = %full_key, "Stored record in Redis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefix() {
        let store = RedisStateStore::open("redis://localhost:6379")
            .unwrap()
            .with_prefix("reels");
        assert_eq!(store.full_key("feedState"), "reels:feedState");
    }

    #[tokio::test]
    async fn test_redis_round_trip() {
        let store = RedisStateStore::open("redis://localhost:6379")
            .unwrap()
            .with_prefix("feed_engine_test");

        // Redis 不可用時跳過
        if let Err(e) = store.put("feedState", "{}".to_string()).await {
            println!("Redis not available, skipping test: {}", e);
            return;
        }

        let value = store.get("feedState").await.unwrap();
        assert_eq!(value.as_deref(), Some("{}"));
    }
}
