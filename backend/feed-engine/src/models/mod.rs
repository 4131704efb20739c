use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Category labels attached to served videos.
///
/// Interest categories are open-ended (any label a video was tagged with can
/// accumulate score), these are the ones the engine itself produces.
pub mod audio_type {
    pub const DIALOGUE: &str = "dialogue";
    pub const BGM: &str = "bgm";
    pub const FUNNY: &str = "funny";
    pub const EMOTIONAL: &str = "emotional";
    pub const ANIME: &str = "anime";
    pub const LOFI: &str = "lofi";
    /// Bootstrap padding and next-reel fallback
    pub const TRENDING: &str = "trending";
    /// Novelty probe appended to personalized batches
    pub const TEST: &str = "test";
}

/// User profile snapshot taken at session start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub language: String,
    pub region: String,
}

impl UserProfile {
    pub fn new(language: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            region: region.into(),
        }
    }
}

/// Video as returned by the content search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub like_count: u64,
    pub comment_count: u64,
}

/// A served video, tagged with the category it was fetched to satisfy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub video: VideoSummary,
    pub audio_type: String,
}

impl FeedItem {
    pub fn new(video: VideoSummary, audio_type: impl Into<String>) -> Self {
        Self {
            video,
            audio_type: audio_type.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.video.id
    }
}

/// Implicit engagement signal reported by the player layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Paused for at least one second
    Pause,
    /// Played to the end
    FullWatch,
    /// Played again after ending
    Replay,
}

impl BehaviorKind {
    pub fn score_delta(self) -> u64 {
        match self {
            BehaviorKind::Pause => 1,
            BehaviorKind::FullWatch => 2,
            BehaviorKind::Replay => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorKind::Pause => "pause",
            BehaviorKind::FullWatch => "full_watch",
            BehaviorKind::Replay => "replay",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown behavior kind: {0}")]
pub struct UnknownBehavior(pub String);

impl FromStr for BehaviorKind {
    type Err = UnknownBehavior;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pause" => Ok(BehaviorKind::Pause),
            "full_watch" => Ok(BehaviorKind::FullWatch),
            "replay" => Ok(BehaviorKind::Replay),
            other => Err(UnknownBehavior(other.to_string())),
        }
    }
}

/// Position in the INTEREST -> DOPAMINE -> SOFT feed loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReelStage {
    Interest,
    Dopamine,
    Soft,
}

impl ReelStage {
    pub const CYCLE: [ReelStage; 3] = [ReelStage::Interest, ReelStage::Dopamine, ReelStage::Soft];

    pub fn next(self) -> Self {
        match self {
            ReelStage::Interest => ReelStage::Dopamine,
            ReelStage::Dopamine => ReelStage::Soft,
            ReelStage::Soft => ReelStage::Interest,
        }
    }

    /// Stage served after `last`; an empty history reads as INTEREST.
    pub fn following(last: Option<ReelStage>) -> Self {
        last.unwrap_or(ReelStage::Interest).next()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReelStage::Interest => "INTEREST",
            ReelStage::Dopamine => "DOPAMINE",
            ReelStage::Soft => "SOFT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INTEREST" => Some(ReelStage::Interest),
            "DOPAMINE" => Some(ReelStage::Dopamine),
            "SOFT" => Some(ReelStage::Soft),
            _ => None,
        }
    }
}

/// Per-category interest scores, kept in first-seen order.
///
/// Ranking is a stable sort on score, so among equal scores the category
/// that was scored first ranks first. Serialized as a JSON object whose key
/// order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestScores {
    entries: Vec<(String, u64)>,
}

impl InterestScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> u64 {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }

    /// Add `delta` to a category, creating it on first signal. Returns the new score.
    pub fn add(&mut self, category: &str, delta: u64) -> u64 {
        if let Some((_, score)) = self.entries.iter_mut().find(|(name, _)| name == category) {
            *score = score.saturating_add(delta);
            return *score;
        }
        self.entries.push((category.to_string(), delta));
        delta
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), *score))
    }

    /// Categories by descending score, ties in insertion order
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn ranked_categories(&self) -> Vec<String> {
        self.ranked()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Highest scoring category; the first-seen one wins ties.
    pub fn leader(&self) -> Option<(&str, u64)> {
        self.ranked().into_iter().next()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for InterestScores {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut scores = InterestScores::new();
        for (category, score) in iter {
            let category = category.into();
            match scores.entries.iter_mut().find(|(name, _)| *name == category) {
                Some(entry) => entry.1 = score,
                None => scores.entries.push((category, score)),
            }
        }
        scores
    }
}

impl Serialize for InterestScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, score) in &self.entries {
            map.serialize_entry(category, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InterestScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = InterestScores;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category to non-negative score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, u64)> = Vec::new();
                while let Some((category, score)) = access.next_entry::<String, u64>()? {
                    entries.push((category, score));
                }
                Ok(entries.into_iter().collect())
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// Persisted personalization record for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    #[serde(default)]
    pub interests: InterestScores,
    #[serde(default)]
    pub primary_interest: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_reel_stage"
    )]
    pub last_reel_type: Option<ReelStage>,
    #[serde(default)]
    pub feed: Vec<FeedItem>,
    pub user_profile: UserProfile,
}

impl FeedState {
    pub fn new(user_profile: UserProfile) -> Self {
        Self {
            interests: InterestScores::new(),
            primary_interest: None,
            last_reel_type: None,
            feed: Vec::new(),
            user_profile,
        }
    }

    pub fn find_video(&self, video_id: &str) -> Option<&FeedItem> {
        self.feed.iter().find(|item| item.id() == video_id)
    }
}

// A stage name this build does not know restarts the loop at INTEREST,
// which is what SOFT advances to.
fn deserialize_reel_stage<'de, D>(deserializer: D) -> Result<Option<ReelStage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|stage| ReelStage::parse(&stage).unwrap_or(ReelStage::Soft)))
}
