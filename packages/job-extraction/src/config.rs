//! Configuration for extraction and content handling.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ExtractionError, Result};
use crate::retry::{Acceptance, RetryPolicy};
use crate::watcher::{WatchConfig, DEFAULT_WATCH_TIMEOUT};

/// Tunables for a content script, loadable from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Retries after the first attempt.
    ///
    /// Default: 3.
    pub max_retries: u32,

    /// Delay between attempts in milliseconds.
    ///
    /// Default: 1000.
    pub retry_delay_ms: u64,

    /// When a partial result is good enough.
    ///
    /// Default: any field present.
    pub acceptance: Acceptance,

    /// Observe DOM changes while extracting (log only).
    ///
    /// Default: true.
    pub watch: bool,

    /// Observation window in milliseconds.
    ///
    /// Default: 10000.
    pub watch_timeout_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            acceptance: Acceptance::AnyField,
            watch: true,
            watch_timeout_ms: DEFAULT_WATCH_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ExtractionConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `JOB_EXTRACTION_*` environment variables.
    ///
    /// Unset variables keep their defaults. A `.env` file is read if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Ok(Self {
            max_retries: env_parse("JOB_EXTRACTION_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
            retry_delay_ms: env_parse("JOB_EXTRACTION_RETRY_DELAY_MS")?
                .unwrap_or(defaults.retry_delay_ms),
            acceptance: env_parse("JOB_EXTRACTION_ACCEPTANCE")?.unwrap_or(defaults.acceptance),
            watch: env_parse("JOB_EXTRACTION_WATCH")?.unwrap_or(defaults.watch),
            watch_timeout_ms: env_parse("JOB_EXTRACTION_WATCH_TIMEOUT_MS")?
                .unwrap_or(defaults.watch_timeout_ms),
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
            .with_acceptance(self.acceptance)
    }

    pub fn watch_config(&self) -> Option<WatchConfig> {
        self.watch.then(|| {
            WatchConfig::default().with_timeout(Duration::from_millis(self.watch_timeout_ms))
        })
    }

    pub fn content_config(&self) -> ContentConfig {
        ContentConfig {
            retry: self.retry_policy(),
            watch: self.watch_config(),
        }
    }
}

impl FromStr for Acceptance {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "any_field" => Ok(Acceptance::AnyField),
            "all" | "all_fields" => Ok(Acceptance::AllFields),
            other => Err(ExtractionError::Config(format!(
                "unknown acceptance {:?}, expected \"any\" or \"all\"",
                other
            ))),
        }
    }
}

/// Resolved settings handed to a content script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    pub retry: RetryPolicy,

    /// `None` disables the change watcher
    pub watch: Option<WatchConfig>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        ExtractionConfig::default().content_config()
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ExtractionError::Config(format!("{} is invalid: {}", key, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_content_defaults() {
        let content = ContentConfig::default();

        assert_eq!(content.retry, RetryPolicy::default());
        assert_eq!(content.watch, Some(WatchConfig::default()));
    }

    #[test]
    fn test_watch_disabled() {
        let config = ExtractionConfig::new().with_watch(false);
        assert_eq!(config.content_config().watch, None);
    }

    #[test]
    fn test_builder_feeds_policy() {
        let policy = ExtractionConfig::new()
            .with_max_retries(6)
            .with_retry_delay(Duration::from_millis(250))
            .with_acceptance(Acceptance::AllFields)
            .retry_policy();

        assert_eq!(policy.max_retries, 6);
        assert_eq!(policy.delay, Duration::from_millis(250));
        assert_eq!(policy.acceptance, Acceptance::AllFields);
    }

    #[test]
    fn test_acceptance_from_str() {
        assert_eq!("ANY".parse::<Acceptance>().unwrap(), Acceptance::AnyField);
        assert_eq!("all_fields".parse::<Acceptance>().unwrap(), Acceptance::AllFields);
        assert!("most".parse::<Acceptance>().is_err());
    }

    // Single test touching the environment to avoid races between tests
    #[test]
    fn test_from_env() {
        env::set_var("JOB_EXTRACTION_MAX_RETRIES", "5");
        env::set_var("JOB_EXTRACTION_ACCEPTANCE", "all");
        env::set_var("JOB_EXTRACTION_WATCH", "false");
        let config = ExtractionConfig::from_env().unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.acceptance, Acceptance::AllFields);
        assert!(!config.watch);
        assert_eq!(config.retry_delay_ms, 1000);

        env::set_var("JOB_EXTRACTION_MAX_RETRIES", "lots");
        let err = ExtractionConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("JOB_EXTRACTION_MAX_RETRIES"));

        env::remove_var("JOB_EXTRACTION_MAX_RETRIES");
        env::remove_var("JOB_EXTRACTION_ACCEPTANCE");
        env::remove_var("JOB_EXTRACTION_WATCH");
    }
}
