pub mod assembler;
pub mod engine;
pub mod search;
pub mod sequencer;
pub mod storage;
pub mod tracker;

pub use assembler::{FeedAssembler, Probe};
pub use engine::FeedEngine;
pub use search::{ContentSearchClient, SearchError, YouTubeSearchClient};
pub use sequencer::{FeedSequencer, FixedPicker, InterestPicker, RandomPicker, ReelPlan, ReelTarget};
pub use storage::{MemoryStateStore, RedisStateStore, StateRepository, StateStore, StorageError};
pub use tracker::{InterestTracker, TrackOutcome};
