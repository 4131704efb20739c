use super::{ContentSearchClient, SearchError};
use crate::config::SearchConfig;
use crate::models::VideoSummary;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// YouTube Data API v3 search client
///
/// Two requests per query: `search` for matching short video ids, then
/// `videos` for title, channel and statistics of those ids.
pub struct YouTubeSearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SearchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentSearchClient for YouTubeSearchClient {
    async fn search(
        &self,
        query: &str,
        region: &str,
        count: usize,
    ) -> Result<Vec<VideoSummary>, SearchError> {
        let max_results = count.to_string();
        let listing: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("videoDuration", "short"),
                    ("maxResults", max_results.as_str()),
                    ("regionCode", region),
                ],
            )
            .await?;

        let ids: Vec<String> = listing
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            debug!(query = query, region = region, "Search returned no videos");
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let details: VideoListResponse = self
            .get_json("videos", &[("part", "statistics,snippet"), ("id", joined.as_str())])
            .await?;

        let total = details.items.len();
        let videos: Vec<VideoSummary> = details
            .items
            .into_iter()
            .filter_map(VideoItem::into_summary)
            .collect();

        if videos.len() < total {
            warn!(
                query = query,
                dropped = total - videos.len(),
                "Dropped videos with incomplete metadata"
            );
        }

        debug!(query = query, region = region, found = videos.len(), "Search completed");
        Ok(videos)
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: Option<String>,
    channel_title: Option<String>,
}

// The API encodes counters as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    like_count: Option<String>,
    comment_count: Option<String>,
}

impl VideoItem {
    fn into_summary(self) -> Option<VideoSummary> {
        let snippet = self.snippet?;
        let statistics = self.statistics?;
        Some(VideoSummary {
            id: self.id,
            title: snippet.title?,
            channel: snippet.channel_title?,
            like_count: statistics.like_count?.parse().ok()?,
            comment_count: statistics.comment_count?.parse().ok()?,
        })
    }
}
