//! Optional `reelsync.toml` configuration with full defaults.

use std::path::Path;
use std::time::Duration;

use reel_ingest::{RetryPolicy, WaitPolicy};
use reel_inventory::StoreConfig;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};

const CONFIG_FILE: &str = "reelsync.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
    pub ingest: IngestSection,
    pub edit: EditSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub lock_timeout_secs: u64,
    pub lock_poll_ms: u64,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            lock_timeout_secs: 30,
            lock_poll_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    pub retries: u32,
    pub retry_base_secs: f64,
    pub retry_factor: f64,
    pub retry_max_secs: f64,
    pub min_wait_secs: f64,
    pub max_wait_secs: f64,
    pub ytdlp_path: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_base_secs: 5.0,
            retry_factor: 3.0,
            retry_max_secs: 90.0,
            min_wait_secs: 1.0,
            max_wait_secs: 6.0,
            ytdlp_path: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditSection {
    pub ffmpeg_path: Option<String>,
    /// Move files to processed/ without applying any effect.
    pub relocate_only: bool,
}

impl AppConfig {
    /// Load from `explicit` when given (missing file is an error), otherwise
    /// from `<base_dir>/reelsync.toml` when present, otherwise defaults.
    pub fn load(explicit: Option<&Path>, base_dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = base_dir.join(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let raw = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&raw).map_err(|err| AppError::Config {
            path: path.clone(),
            message: err.to_string(),
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            lock_timeout: Duration::from_secs(self.storage.lock_timeout_secs),
            lock_poll_interval: Duration::from_millis(self.storage.lock_poll_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.ingest.retries,
            base: Duration::from_secs_f64(self.ingest.retry_base_secs),
            factor: self.ingest.retry_factor,
            max_wait: Duration::from_secs_f64(self.ingest.retry_max_secs),
            jitter: true,
        }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::from_env(
            Duration::from_secs_f64(self.ingest.min_wait_secs),
            Duration::from_secs_f64(self.ingest.max_wait_secs),
        )
    }
}
