pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{FeedError, Result};
pub use models::{BehaviorKind, FeedItem, FeedState, InterestScores, ReelStage, UserProfile, VideoSummary};
pub use services::{
    ContentSearchClient, FeedAssembler, FeedEngine, FeedSequencer, InterestTracker,
    MemoryStateStore, RedisStateStore, StateRepository, StateStore, YouTubeSearchClient,
};
