// ============================================
// Feed Assembler
// ============================================
//
// Bootstrap (first session): six fixed probes, one per audio type, issued
// concurrently, then two trending/viral padding probes. Output order is
// request order, never arrival order.
//
// Personalized batch: for each loop i the i-th ranked interest (wrapping),
//   [interest, funny, lofi, interest "new"]
// followed by one "trending new" novelty probe tagged `test`.
//
// Probes that come back empty are omitted. No placeholders, no retries.

use super::search::{ContentSearchClient, SearchError};
use crate::models::{audio_type, FeedItem, FeedState, UserProfile};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_PERSONALIZED_LOOPS: usize = 3;

/// One search issued on behalf of a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub audio_type: String,
    pub query: String,
}

impl Probe {
    pub fn new(audio_type: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            audio_type: audio_type.into(),
            query: query.into(),
        }
    }
}

/// First-session test sequence. Order matters.
pub fn bootstrap_probes(profile: &UserProfile) -> Vec<Probe> {
    let language = &profile.language;
    vec![
        Probe::new(audio_type::DIALOGUE, format!("emotional movie dialogue {}", language)),
        Probe::new(audio_type::BGM, format!("mass bgm hype {}", language)),
        Probe::new(audio_type::FUNNY, format!("funny meme audio {}", language)),
        Probe::new(audio_type::EMOTIONAL, format!("sad romantic music {}", language)),
        Probe::new(audio_type::ANIME, "anime opening fight sound"),
        Probe::new(audio_type::LOFI, "lofi aesthetic calm music"),
    ]
}

pub fn padding_probes(profile: &UserProfile) -> Vec<Probe> {
    vec![
        Probe::new(audio_type::TRENDING, format!("trending shorts {}", profile.region)),
        Probe::new(audio_type::TRENDING, format!("viral shorts {}", profile.language)),
    ]
}

/// Interest -> dopamine -> soft -> interest variation
pub fn loop_probes(interest: &str, profile: &UserProfile) -> Vec<Probe> {
    let language = &profile.language;
    vec![
        Probe::new(interest, format!("{} {}", interest, language)),
        Probe::new(audio_type::FUNNY, format!("funny hype action {}", language)),
        Probe::new(audio_type::LOFI, format!("calm emotional aesthetic {}", language)),
        Probe::new(interest, format!("{} {} new", interest, language)),
    ]
}

pub fn novelty_probe(profile: &UserProfile) -> Probe {
    Probe::new(audio_type::TEST, format!("trending new {}", profile.region))
}

pub struct FeedAssembler {
    search: Arc<dyn ContentSearchClient>,
    loops: usize,
    results_per_query: usize,
}

impl FeedAssembler {
    pub fn new(search: Arc<dyn ContentSearchClient>) -> Self {
        Self {
            search,
            loops: DEFAULT_PERSONALIZED_LOOPS,
            results_per_query: 1,
        }
    }

    pub fn with_loops(mut self, loops: usize) -> Self {
        self.loops = loops;
        self
    }

    pub fn with_results_per_query(mut self, count: usize) -> Self {
        self.results_per_query = count.max(1);
        self
    }

    /// Bootstrap feed: up to 6 probe results plus 2 padding results
    pub async fn initial_feed(&self, profile: &UserProfile) -> Result<Vec<FeedItem>, SearchError> {
        let mut feed = self.fan_out(&bootstrap_probes(profile), &profile.region).await?;
        feed.extend(self.fan_out(&padding_probes(profile), &profile.region).await?);

        info!(
            language = %profile.language,
            region = %profile.region,
            count = feed.len(),
            "Bootstrap feed assembled"
        );
        Ok(feed)
    }

    /// Personalized batch: `loops * 4 + 1` probes.
    ///
    /// Without a primary interest there is nothing to personalize on, and
    /// the bootstrap sequence is served instead.
    pub async fn personalized_feed(&self, state: &FeedState) -> Result<Vec<FeedItem>, SearchError> {
        let Some(primary) = state.primary_interest.as_deref() else {
            debug!("No primary interest yet, serving bootstrap sequence");
            return self.initial_feed(&state.user_profile).await;
        };

        let profile = &state.user_profile;
        let ranked = state.interests.ranked_categories();
        let mut feed = Vec::with_capacity(self.loops * 4 + 1);

        for i in 0..self.loops {
            let current = if ranked.is_empty() {
                primary
            } else {
                ranked[i % ranked.len()].as_str()
            };
            feed.extend(self.fan_out(&loop_probes(current, profile), &profile.region).await?);
        }

        feed.extend(self.fan_out(&[novelty_probe(profile)], &profile.region).await?);

        info!(
            primary = primary,
            interests = ranked.len(),
            count = feed.len(),
            "Personalized batch assembled"
        );
        Ok(feed)
    }

    /// Issue every probe concurrently and keep the first hit of each,
    /// in probe order.
    async fn fan_out(&self, probes: &[Probe], region: &str) -> Result<Vec<FeedItem>, SearchError> {
        let searches = probes
            .iter()
            .map(|probe| self.search.search(&probe.query, region, self.results_per_query));
        let results = try_join_all(searches).await?;

        Ok(probes
            .iter()
            .zip(results)
            .filter_map(|(probe, videos)| match videos.into_iter().next() {
                Some(video) => Some(FeedItem::new(video, probe.audio_type.clone())),
                None => {
                    debug!(
                        audio_type = %probe.audio_type,
                        query = %probe.query,
                        "Probe returned no videos, omitted"
                    );
                    None
                }
            })
            .collect())
    }
}
