use async_trait::async_trait;
use feed_engine::services::SearchError;
use feed_engine::{ContentSearchClient, VideoSummary};
use std::collections::HashMap;
use std::sync::Mutex;

/// Search client that answers from a query table and can be rewired
/// between calls.
#[derive(Default)]
pub struct CatalogSearch {
    catalog: Mutex<HashMap<String, Vec<VideoSummary>>>,
    down: Mutex<bool>,
    calls: Mutex<Vec<String>>,
}

impl CatalogSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, query: &str, video_id: &str) {
        self.catalog
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push(VideoSummary {
                id: video_id.to_string(),
                title: format!("{} ({})", query, video_id),
                channel: "catalog".to_string(),
                like_count: 42,
                comment_count: 4,
            });
    }

    pub fn set_down(&self, down: bool) {
        *self.down.lock().unwrap() = down;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSearchClient for CatalogSearch {
    async fn search(
        &self,
        query: &str,
        _region: &str,
        count: usize,
    ) -> Result<Vec<VideoSummary>, SearchError> {
        self.calls.lock().unwrap().push(query.to_string());
        if *self.down.lock().unwrap() {
            return Err(SearchError::Unavailable("catalog offline".to_string()));
        }
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .get(query)
            .map(|videos| videos.iter().take(count).cloned().collect())
            .unwrap_or_default())
    }
}
