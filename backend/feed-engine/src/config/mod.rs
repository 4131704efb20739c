use crate::models::UserProfile;
use crate::services::assembler::DEFAULT_PERSONALIZED_LOOPS;
use crate::services::sequencer::DEFAULT_INTEREST_POOL_SIZE;
use crate::services::tracker::DEFAULT_LOCK_THRESHOLD;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub search: SearchConfig,
    pub storage: StorageConfig,
    pub feed: FeedConfig,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Feed state stays in process memory when unset
    pub redis_url: Option<String>,
    pub state_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub lock_threshold: u64,
    pub personalized_loops: usize,
    pub interest_pool_size: usize,
    pub results_per_query: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            lock_threshold: DEFAULT_LOCK_THRESHOLD,
            personalized_loops: DEFAULT_PERSONALIZED_LOOPS,
            interest_pool_size: DEFAULT_INTEREST_POOL_SIZE,
            results_per_query: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = FeedConfig::default();

        Ok(Config {
            service: ServiceConfig {
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "feed-engine".to_string()),
                log_format: parse_env("LOG_FORMAT", LogFormat::Pretty)?,
            },
            search: SearchConfig {
                api_base_url: env::var("YOUTUBE_API_BASE_URL")
                    .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string()),
                api_key: env::var("YOUTUBE_API_KEY").unwrap_or_default(),
                timeout_secs: parse_env("SEARCH_TIMEOUT_SECS", 10)?,
            },
            storage: StorageConfig {
                redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
                state_key: env::var("FEED_STATE_KEY").unwrap_or_else(|_| "feedState".to_string()),
            },
            feed: FeedConfig {
                lock_threshold: parse_env("INTEREST_LOCK_THRESHOLD", defaults.lock_threshold)?,
                personalized_loops: parse_env("PERSONALIZED_LOOPS", defaults.personalized_loops)?,
                interest_pool_size: parse_env("INTEREST_POOL_SIZE", defaults.interest_pool_size)?,
                results_per_query: parse_env(
                    "SEARCH_RESULTS_PER_QUERY",
                    defaults.results_per_query,
                )?,
            },
            profile: UserProfile {
                language: env::var("USER_LANGUAGE").unwrap_or_else(|_| "english".to_string()),
                region: env::var("USER_REGION").unwrap_or_else(|_| "US".to_string()),
            },
        })
    }
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_invalid() {
        env::remove_var("FEED_ENGINE_TEST_UNSET");
        assert_eq!(parse_env("FEED_ENGINE_TEST_UNSET", 7usize).unwrap(), 7);

        env::set_var("FEED_ENGINE_TEST_LOOPS", "three");
        let err = parse_env::<usize>("FEED_ENGINE_TEST_LOOPS", 3).unwrap_err();
        assert!(err.to_string().contains("FEED_ENGINE_TEST_LOOPS"));

        env::set_var("FEED_ENGINE_TEST_LOOPS", "5");
        assert_eq!(parse_env::<usize>("FEED_ENGINE_TEST_LOOPS", 3).unwrap(), 5);
        env::remove_var("FEED_ENGINE_TEST_LOOPS");
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_feed_defaults() {
        let feed = FeedConfig::default();
        assert_eq!(feed.lock_threshold, 3);
        assert_eq!(feed.personalized_loops, 3);
        assert_eq!(feed.interest_pool_size, 3);
        assert_eq!(feed.results_per_query, 1);
    }
}
