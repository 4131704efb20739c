// ============================================
// Feed Engine
// ============================================
//
// Entry point for the UI layer. Every operation takes the session's
// FeedState explicitly, works on a copy, and only swaps the copy in after
// all searches for the call have returned and the record has been written.
// A failed call leaves both the caller's state and the stored record as
// they were.

use super::assembler::FeedAssembler;
use super::search::ContentSearchClient;
use super::sequencer::{FeedSequencer, InterestPicker, RandomPicker};
use super::storage::StateRepository;
use super::tracker::{InterestTracker, TrackOutcome};
use crate::config::FeedConfig;
use crate::error::Result;
use crate::models::{BehaviorKind, FeedItem, FeedState, UserProfile};
use std::sync::Arc;
use tracing::{debug, info};

pub struct FeedEngine {
    search: Arc<dyn ContentSearchClient>,
    repository: StateRepository,
    tracker: InterestTracker,
    sequencer: FeedSequencer,
    assembler: FeedAssembler,
}

impl FeedEngine {
    pub fn new(
        search: Arc<dyn ContentSearchClient>,
        repository: StateRepository,
        config: &FeedConfig,
    ) -> Self {
        Self::with_picker(search, repository, config, Arc::new(RandomPicker::new()))
    }

    /// Build an engine with a specific source of randomness for the
    /// INTEREST stage pick.
    pub fn with_picker(
        search: Arc<dyn ContentSearchClient>,
        repository: StateRepository,
        config: &FeedConfig,
        picker: Arc<dyn InterestPicker>,
    ) -> Self {
        let sequencer = FeedSequencer::new(picker)
            .with_interest_pool_size(config.interest_pool_size)
            .with_results_per_query(config.results_per_query);
        let assembler = FeedAssembler::new(search.clone())
            .with_loops(config.personalized_loops)
            .with_results_per_query(config.results_per_query);

        Self {
            search,
            repository,
            tracker: InterestTracker::new(config.lock_threshold),
            sequencer,
            assembler,
        }
    }

    /// Load the persisted state or start a new one.
    ///
    /// The session keeps its own copy of `profile` for building queries.
    pub async fn open_session(&self, profile: UserProfile) -> Result<FeedState> {
        let state = match self.repository.load().await? {
            Some(mut state) => {
                debug!(feed_len = state.feed.len(), "Resuming feed session");
                state.user_profile = profile;
                state
            }
            None => {
                info!(language = %profile.language, region = %profile.region, "Starting new feed state");
                FeedState::new(profile)
            }
        };

        self.repository.save(&state).await?;
        Ok(state)
    }

    /// Clear scores, lock, stage and history
    pub async fn reset_session(&self, profile: UserProfile) -> Result<FeedState> {
        let state = FeedState::new(profile);
        self.repository.save(&state).await?;
        info!(key = self.repository.key(), "Feed state reset");
        Ok(state)
    }

    pub async fn get_initial_feed(&self, state: &mut FeedState) -> Result<Vec<FeedItem>> {
        let items = self.assembler.initial_feed(&state.user_profile).await?;
        self.append_and_commit(state, &items).await?;
        Ok(items)
    }

    pub async fn get_personalized_feed(&self, state: &mut FeedState) -> Result<Vec<FeedItem>> {
        let items = self.assembler.personalized_feed(state).await?;
        self.append_and_commit(state, &items).await?;
        Ok(items)
    }

    /// Next reel in the feed loop; `None` once even trending is exhausted.
    pub async fn construct_next_reel(&self, state: &mut FeedState) -> Result<Option<FeedItem>> {
        let mut next = state.clone();
        let item = self.sequencer.advance(&mut next, self.search.as_ref()).await?;
        if item.is_some() {
            self.commit(state, next).await?;
        }
        Ok(item)
    }

    pub async fn record_behavior(
        &self,
        state: &mut FeedState,
        video_id: &str,
        behavior: BehaviorKind,
    ) -> Result<()> {
        self.track(state, video_id, Some(behavior)).await
    }

    /// Same as [`record_behavior`](Self::record_behavior) for a raw event
    /// name from the player; unknown names change no score.
    pub async fn record_behavior_event(
        &self,
        state: &mut FeedState,
        video_id: &str,
        behavior: &str,
    ) -> Result<()> {
        let kind = match behavior.parse::<BehaviorKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                debug!(video_id = video_id, error = %e, "Unclassified behavior event");
                None
            }
        };
        self.track(state, video_id, kind).await
    }

    async fn track(
        &self,
        state: &mut FeedState,
        video_id: &str,
        behavior: Option<BehaviorKind>,
    ) -> Result<()> {
        let mut next = state.clone();
        if let TrackOutcome::UnknownVideo = self.tracker.track(&mut next, video_id, behavior) {
            return Ok(());
        }
        self.commit(state, next).await
    }

    async fn append_and_commit(&self, state: &mut FeedState, items: &[FeedItem]) -> Result<()> {
        let mut next = state.clone();
        next.feed.extend_from_slice(items);
        self.commit(state, next).await
    }

    async fn commit(&self, state: &mut FeedState, next: FeedState) -> Result<()> {
        self.repository.save(&next).await?;
        *state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::models::{InterestScores, ReelStage};
    use crate::services::search::testing::ScriptedSearch;
    use crate::services::sequencer::FixedPicker;
    use crate::services::storage::{MemoryStateStore, StateStore, StorageError};
    use async_trait::async_trait;

    struct ReadOnlyStore;

    #[async_trait]
    impl StateStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn put(&self, _key: &str, _value: String) -> std::result::Result<(), StorageError> {
            Err(StorageError::Backend("read only".to_string()))
        }
    }

    fn engine_with(search: ScriptedSearch, store: Arc<dyn StateStore>) -> FeedEngine {
        FeedEngine::with_picker(
            Arc::new(search),
            StateRepository::new(store, "feedState"),
            &FeedConfig::default(),
            Arc::new(FixedPicker(0)),
        )
    }

    #[tokio::test]
    async fn test_open_session_creates_and_resumes() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());
        let engine = engine_with(ScriptedSearch::new(), store.clone());

        let state = engine
            .open_session(UserProfile::new("en", "US"))
            .await
            .unwrap();
        assert!(state.feed.is_empty());
        assert!(store.get("feedState").await.unwrap().is_some());

        let mut persisted = state.clone();
        persisted.interests = InterestScores::from_iter([("lofi", 4)]);
        persisted.primary_interest = Some("lofi".to_string());
        StateRepository::new(store.clone(), "feedState")
            .save(&persisted)
            .await
            .unwrap();

        let resumed = engine
            .open_session(UserProfile::new("hindi", "IN"))
            .await
            .unwrap();
        assert_eq!(resumed.primary_interest.as_deref(), Some("lofi"));
        assert_eq!(resumed.user_profile, UserProfile::new("hindi", "IN"));
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_caller_state() {
        let search = ScriptedSearch::new().with_video("funny hype action en", "d1");
        let engine = engine_with(search, Arc::new(ReadOnlyStore));
        let mut state = FeedState::new(UserProfile::new("en", "US"));
        let before = state.clone();

        let err = engine.construct_next_reel(&mut state).await.unwrap_err();

        assert!(matches!(err, FeedError::Storage(_)));
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_unknown_behavior_event_still_persists() {
        let store = Arc::new(MemoryStateStore::new());
        let search = ScriptedSearch::new().with_video("funny hype action en", "d1");
        let engine = engine_with(search, store.clone());
        let mut state = FeedState::new(UserProfile::new("en", "US"));

        engine.construct_next_reel(&mut state).await.unwrap();
        engine
            .record_behavior_event(&mut state, "d1", "double_tap")
            .await
            .unwrap();

        assert!(state.interests.is_empty());
        assert_eq!(state.last_reel_type, Some(ReelStage::Dopamine));
        let stored = StateRepository::new(store, "feedState").load().await.unwrap();
        assert_eq!(stored, Some(state));
    }
}
