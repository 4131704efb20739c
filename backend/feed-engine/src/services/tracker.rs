// ============================================
// Interest Tracker
// ============================================
//
// Turns implicit engagement signals into per-category interest scores:
// - pause (>= 1s, classified by the player) -> +1
// - full watch                              -> +2
// - replay                                  -> +5 and immediate lock
//
// The primary interest locks once a category reaches the threshold and is
// never released by pause/full_watch. Only replay moves it.

use crate::models::{BehaviorKind, FeedState};
use tracing::{debug, info};

pub const DEFAULT_LOCK_THRESHOLD: u64 = 3;

/// Result of applying one behavior event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// The video is not in the served feed; nothing changed
    UnknownVideo,
    /// Applied to the video's category
    Tracked {
        category: String,
        score: u64,
        primary_interest: Option<String>,
    },
}

impl TrackOutcome {
    pub fn is_tracked(&self) -> bool {
        matches!(self, TrackOutcome::Tracked { .. })
    }
}

#[derive(Debug, Clone)]
pub struct InterestTracker {
    lock_threshold: u64,
}

impl Default for InterestTracker {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_THRESHOLD)
    }
}

impl InterestTracker {
    pub fn new(lock_threshold: u64) -> Self {
        Self { lock_threshold }
    }

    /// Apply a behavior event to `state`.
    ///
    /// `behavior` is `None` for event kinds the caller could not classify;
    /// those change no score but still get the lock re-evaluated.
    pub fn track(
        &self,
        state: &mut FeedState,
        video_id: &str,
        behavior: Option<BehaviorKind>,
    ) -> TrackOutcome {
        let Some(category) = state.find_video(video_id).map(|item| item.audio_type.clone()) else {
            debug!(video_id = video_id, "Behavior for unknown video ignored");
            return TrackOutcome::UnknownVideo;
        };

        if let Some(kind) = behavior {
            let score = state.interests.add(&category, kind.score_delta());
            debug!(
                video_id = video_id,
                category = %category,
                behavior = kind.as_str(),
                score = score,
                "Interest updated"
            );

            if kind == BehaviorKind::Replay {
                if state.primary_interest.as_deref() != Some(category.as_str()) {
                    info!(
                        category = %category,
                        previous = ?state.primary_interest,
                        "Primary interest locked by replay"
                    );
                }
                state.primary_interest = Some(category.clone());
            }
        }

        if state.primary_interest.is_none() {
            self.lock_on_threshold(state);
        }

        TrackOutcome::Tracked {
            score: state.interests.get(&category),
            category,
            primary_interest: state.primary_interest.clone(),
        }
    }

    fn lock_on_threshold(&self, state: &mut FeedState) {
        let leader = state
            .interests
            .leader()
            .map(|(category, score)| (category.to_string(), score));

        if let Some((category, score)) = leader {
            if score >= self.lock_threshold {
                info!(category = %category, score = score, "Primary interest locked");
                state.primary_interest = Some(category);
            }
        }
    }
}
