//! Runtime configuration loaded from environment variables.
//!
//! Binaries call [`load_dotenv`] first so a local `.env` file can supply the
//! credentials. Credentials are checked by the component that needs them, so
//! the validator and the edge server do not require an LLM key.

use crate::error::{Result, TpotmonError};
use crate::http::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_TWITTER_API_BASE: &str = "https://api.twitterapi.io";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CARDS_DIR: &str = "./cards";
pub const DEFAULT_MAX_TWEETS: usize = 100;
pub const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, Clone)]
pub struct Config {
    pub twitter_api_key: Option<String>,
    pub twitter_api_base: String,
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_model: String,
    pub cards_dir: String,
    pub max_tweets: usize,
    pub http_timeout_secs: u64,
    pub port: u16,
    pub publish_url: Option<String>,
    pub publish_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            twitter_api_key: None,
            twitter_api_base: DEFAULT_TWITTER_API_BASE.to_string(),
            openai_api_key: None,
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            cards_dir: DEFAULT_CARDS_DIR.to_string(),
            max_tweets: DEFAULT_MAX_TWEETS,
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            port: DEFAULT_PORT,
            publish_url: None,
            publish_token: None,
        }
    }
}

/// Load `.env` into the process environment if present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to read .env"),
    }
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// - `TWITTER_API_KEY`, `OPENAI_API_KEY`: credentials
    /// - `TPOTMON_TWITTER_API_BASE`, `TPOTMON_OPENAI_API_BASE`: API hosts
    /// - `TPOTMON_OPENAI_MODEL`: chat model name
    /// - `TPOTMON_CARDS_DIR`: output directory for card files
    /// - `TPOTMON_MAX_TWEETS`: cap on fetched tweets (default 100)
    /// - `TPOTMON_HTTP_TIMEOUT_SECS`: per-request timeout
    /// - `TPOTMON_PORT`: edge server port
    /// - `TPOTMON_PUBLISH_URL`, `TPOTMON_PUBLISH_TOKEN`: optional remote collector
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let config = Self {
            twitter_api_key: non_empty("TWITTER_API_KEY"),
            twitter_api_base: non_empty("TPOTMON_TWITTER_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.twitter_api_base),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_api_base: non_empty("TPOTMON_OPENAI_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_api_base),
            openai_model: non_empty("TPOTMON_OPENAI_MODEL").unwrap_or(defaults.openai_model),
            cards_dir: non_empty("TPOTMON_CARDS_DIR").unwrap_or(defaults.cards_dir),
            max_tweets: non_empty("TPOTMON_MAX_TWEETS")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(defaults.max_tweets),
            http_timeout_secs: non_empty("TPOTMON_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .map(|s| s.clamp(1, 600))
                .unwrap_or(defaults.http_timeout_secs),
            port: non_empty("TPOTMON_PORT")
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            publish_url: non_empty("TPOTMON_PUBLISH_URL"),
            publish_token: non_empty("TPOTMON_PUBLISH_TOKEN"),
        };

        tracing::debug!(
            twitter_api_base = %config.twitter_api_base,
            openai_api_base = %config.openai_api_base,
            openai_model = %config.openai_model,
            cards_dir = %config.cards_dir,
            max_tweets = config.max_tweets,
            has_twitter_key = config.twitter_api_key.is_some(),
            has_openai_key = config.openai_api_key.is_some(),
            "configuration loaded"
        );

        config
    }

    pub fn require_twitter_api_key(&self) -> Result<&str> {
        self.twitter_api_key
            .as_deref()
            .ok_or_else(|| TpotmonError::MissingConfig("TWITTER_API_KEY is not set".to_string()))
    }

    pub fn require_openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| TpotmonError::MissingConfig("OPENAI_API_KEY is not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.twitter_api_base, DEFAULT_TWITTER_API_BASE);
        assert_eq!(config.max_tweets, 100);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.http_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.require_twitter_api_key().is_err());
        assert!(config.require_openai_api_key().is_err());
    }

    #[test]
    fn test_overrides_are_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("TWITTER_API_KEY", "  key123 "),
            ("TPOTMON_TWITTER_API_BASE", "http://127.0.0.1:9000/"),
            ("TPOTMON_MAX_TWEETS", "25"),
            ("TPOTMON_HTTP_TIMEOUT_SECS", "0"),
            ("TPOTMON_PORT", "not-a-port"),
        ]));
        assert_eq!(config.require_twitter_api_key().unwrap(), "key123");
        assert_eq!(config.twitter_api_base, "http://127.0.0.1:9000");
        assert_eq!(config.max_tweets, 25);
        assert_eq!(config.http_timeout_secs, 1);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")]));
        match config.require_openai_api_key() {
            Err(TpotmonError::MissingConfig(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("expected MissingConfig, got: {:?}", other),
        }
    }
}
