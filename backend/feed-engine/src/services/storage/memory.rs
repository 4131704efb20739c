use super::{StateStore, StorageError};
use async_trait::async_trait;
use dashmap::DashMap;

/// Process-local store, used when no Redis is configured and in tests
#[derive(Default)]
pub struct MemoryStateStore {
    entries: DashMap<String, String>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
