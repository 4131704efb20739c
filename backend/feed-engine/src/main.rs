use anyhow::Context;
use feed_engine::config::LogFormat;
use feed_engine::{
    Config, FeedEngine, MemoryStateStore, RedisStateStore, StateRepository, StateStore,
    YouTubeSearchClient,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.service.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }

    info!(
        service = %config.service.service_name,
        language = %config.profile.language,
        region = %config.profile.region,
        "Starting feed engine"
    );

    if config.search.api_key.is_empty() {
        warn!("YOUTUBE_API_KEY not set - search requests will be rejected upstream");
    }
    let search = Arc::new(
        YouTubeSearchClient::new(&config.search).context("Failed to build search client")?,
    );

    let store: Arc<dyn StateStore> = match &config.storage.redis_url {
        Some(url) => Arc::new(RedisStateStore::open(url).context("Invalid REDIS_URL")?),
        None => {
            warn!("REDIS_URL not set - feed state is kept in memory only");
            Arc::new(MemoryStateStore::new())
        }
    };
    let repository = StateRepository::new(store, config.storage.state_key.clone());

    let engine = FeedEngine::new(search, repository, &config.feed);
    let mut state = engine.open_session(config.profile.clone()).await?;

    let batch = engine.get_personalized_feed(&mut state).await?;
    let next = engine.construct_next_reel(&mut state).await?;

    info!(
        batch = batch.len(),
        next = next.as_ref().map(|item| item.id()),
        primary = ?state.primary_interest,
        feed_len = state.feed.len(),
        "Feed generated"
    );

    let output = serde_json::json!({
        "batch": batch,
        "next": next,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
