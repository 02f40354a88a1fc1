use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::judge_api::DEFAULT_API_TIMEOUT;
use crate::submission_tracker::DEFAULT_MAX_STORED;
use crate::submit_monitor::{RESULT_DEBOUNCE, SUBMIT_TIMEOUT};

const ENV_PREFIX: &str = "JUDGE_WATCH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How many completed submission ids to remember.
    pub max_stored: usize,
    pub fetch_timeout_secs: u64,
    pub max_concurrent_checks: usize,
    pub queue_capacity: usize,
    pub submit_timeout_secs: u64,
    pub debounce_millis: u64,
    pub log_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            max_stored: DEFAULT_MAX_STORED,
            fetch_timeout_secs: DEFAULT_API_TIMEOUT.as_secs(),
            max_concurrent_checks: 5,
            queue_capacity: 1000,
            submit_timeout_secs: SUBMIT_TIMEOUT.as_secs(),
            debounce_millis: RESULT_DEBOUNCE.as_millis() as u64,
            log_dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional file, then `JUDGE_WATCH_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Command-line values win over everything loaded.
    pub fn with_overrides(mut self, max_stored: Option<usize>) -> Self {
        if let Some(max_stored) = max_stored {
            self.max_stored = max_stored;
        }
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_millis)
    }
}
