// ============================================
// Feed Sequencer (perfect feed loop)
// ============================================
//
// INTEREST -> DOPAMINE -> SOFT -> INTEREST -> ...
//
// - INTEREST: one of the top scored categories, picked at random
// - DOPAMINE: fixed "funny hype action" query, tagged funny
// - SOFT:     fixed "calm emotional aesthetic" query, tagged lofi
//
// Zero results fall back to "trending {region}". The stage still advances
// on that fallback; it stays put only when nothing at all was found.

use super::search::{ContentSearchClient, SearchError};
use crate::models::{audio_type, FeedItem, FeedState, ReelStage, UserProfile};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

pub const DEFAULT_INTEREST_POOL_SIZE: usize = 3;

/// Source of randomness for the INTEREST stage pick
pub trait InterestPicker: Send + Sync {
    /// Index in `0..candidates`; `candidates` is at least 1.
    fn pick(&self, candidates: usize) -> usize;
}

/// Uniform picker backed by a seedable RNG
pub struct RandomPicker {
    rng: Mutex<StdRng>,
}

impl RandomPicker {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl InterestPicker for RandomPicker {
    fn pick(&self, candidates: usize) -> usize {
        if candidates <= 1 {
            return 0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..candidates)
    }
}

/// Always picks the same rank (clamped to the candidate count)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl InterestPicker for FixedPicker {
    fn pick(&self, candidates: usize) -> usize {
        self.0.min(candidates.saturating_sub(1))
    }
}

/// What the next reel should be
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelPlan {
    pub stage: ReelStage,
    /// `None` when the INTEREST stage has neither scores nor a lock
    pub target: Option<ReelTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelTarget {
    pub audio_type: String,
    pub query: String,
}

pub fn trending_query(profile: &UserProfile) -> String {
    format!("trending {}", profile.region)
}

pub struct FeedSequencer {
    picker: Arc<dyn InterestPicker>,
    interest_pool_size: usize,
    results_per_query: usize,
}

impl FeedSequencer {
    pub fn new(picker: Arc<dyn InterestPicker>) -> Self {
        Self {
            picker,
            interest_pool_size: DEFAULT_INTEREST_POOL_SIZE,
            results_per_query: 1,
        }
    }

    pub fn with_interest_pool_size(mut self, size: usize) -> Self {
        self.interest_pool_size = size.max(1);
        self
    }

    pub fn with_results_per_query(mut self, count: usize) -> Self {
        self.results_per_query = count.max(1);
        self
    }

    /// Decide the next stage and its query without touching `state`
    pub fn next_category(&self, state: &FeedState) -> ReelPlan {
        let stage = ReelStage::following(state.last_reel_type);
        let language = &state.user_profile.language;

        let target = match stage {
            ReelStage::Interest => self.resolve_interest(state).map(|category| ReelTarget {
                query: format!("{} {}", category, language),
                audio_type: category,
            }),
            ReelStage::Dopamine => Some(ReelTarget {
                audio_type: audio_type::FUNNY.to_string(),
                query: format!("funny hype action {}", language),
            }),
            ReelStage::Soft => Some(ReelTarget {
                audio_type: audio_type::LOFI.to_string(),
                query: format!("calm emotional aesthetic {}", language),
            }),
        };

        ReelPlan { stage, target }
    }

    fn resolve_interest(&self, state: &FeedState) -> Option<String> {
        let ranked = state.interests.ranked();
        if ranked.is_empty() {
            return state.primary_interest.clone();
        }

        let pool = ranked.len().min(self.interest_pool_size);
        let index = self.picker.pick(pool).min(pool - 1);
        Some(ranked[index].0.to_string())
    }

    /// Fetch the next reel and record it in `state`.
    ///
    /// `state` is only modified once every search for this call has
    /// returned; a search error leaves it untouched.
    pub async fn advance(
        &self,
        state: &mut FeedState,
        search: &dyn ContentSearchClient,
    ) -> Result<Option<FeedItem>, SearchError> {
        let plan = self.next_category(state);
        let region = state.user_profile.region.clone();

        let mut next = None;
        if let Some(target) = &plan.target {
            debug!(stage = plan.stage.as_str(), query = %target.query, "Fetching next reel");
            let videos = search
                .search(&target.query, &region, self.results_per_query)
                .await?;
            next = videos
                .into_iter()
                .next()
                .map(|video| FeedItem::new(video, target.audio_type.clone()));
        }

        if next.is_none() {
            let query = trending_query(&state.user_profile);
            warn!(
                stage = plan.stage.as_str(),
                query = %query,
                "No results for reel, falling back to trending"
            );
            let videos = search.search(&query, &region, self.results_per_query).await?;
            next = videos
                .into_iter()
                .next()
                .map(|video| FeedItem::new(video, audio_type::TRENDING));
        }

        let Some(item) = next else {
            warn!(stage = plan.stage.as_str(), "Feed exhausted, stage not advanced");
            return Ok(None);
        };

        state.last_reel_type = Some(plan.stage);
        state.feed.push(item.clone());

        info!(
            stage = plan.stage.as_str(),
            video_id = item.id(),
            audio_type = %item.audio_type,
            "Next reel constructed"
        );
        Ok(Some(item))
    }
}
