use super::{ContentSearchClient, SearchError};
use crate::models::VideoSummary;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn video(id: &str) -> VideoSummary {
    VideoSummary {
        id: id.to_string(),
        title: format!("video {}", id),
        channel: "test channel".to_string(),
        like_count: 100,
        comment_count: 7,
    }
}

/// Search client answering from a fixed query table
#[derive(Default)]
pub(crate) struct ScriptedSearch {
    responses: HashMap<String, Vec<VideoSummary>>,
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSearch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_video(mut self, query: &str, video_id: &str) -> Self {
        self.responses
            .entry(query.to_string())
            .or_default()
            .push(video(video_id));
        self
    }

    pub(crate) fn with_delay(mut self, query: &str, millis: u64) -> Self {
        self.delays
            .insert(query.to_string(), Duration::from_millis(millis));
        self
    }

    pub(crate) fn failing(mut self, query: &str) -> Self {
        self.failures.insert(query.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSearchClient for ScriptedSearch {
    async fn search(
        &self,
        query: &str,
        _region: &str,
        count: usize,
    ) -> Result<Vec<VideoSummary>, SearchError> {
        self.calls.lock().unwrap().push(query.to_string());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failures.contains(query) {
            return Err(SearchError::Unavailable(format!("scripted failure: {}", query)));
        }

        Ok(self
            .responses
            .get(query)
            .map(|videos| videos.iter().take(count).cloned().collect())
            .unwrap_or_default())
    }
}
