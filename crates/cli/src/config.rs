use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use enrich::{ClientError, DEFAULT_BASE_URL};
use fetch::{DEFAULT_WORKERS, ExponentialBackoff, NoRetry, RetryIf, RetryStrategy};
use pipeline::{
    ArtifactPaths, ENTITIES_FILE, FailurePolicy, PLACE_IDS_FILE, PipelineConfig, REVIEWS_FILE,
    SENTIMENT_FILE,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub concurrency: ConcurrencyConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub artifacts: ArtifactConfig,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 0 disables retries.
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    pub place_ids: String,
    pub reviews: String,
    pub sentiment: String,
    pub entities: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 500,
            max_backoff_ms: 5000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10000,
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cache"),
            place_ids: PLACE_IDS_FILE.to_string(),
            reviews: REVIEWS_FILE.to_string(),
            sentiment: SENTIMENT_FILE.to_string(),
            entities: ENTITIES_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, overlaid with the TOML file when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .context("No API key configured (set REVIEW_ETL_API_KEY or api.api_key)")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn place_ids_path(&self) -> PathBuf {
        self.artifacts.dir.join(&self.artifacts.place_ids)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        let dir = &self.artifacts.dir;
        ArtifactPaths {
            reviews: dir.join(&self.artifacts.reviews),
            sentiment: dir.join(&self.artifacts.sentiment),
            entities: dir.join(&self.artifacts.entities),
        }
    }

    /// Backoff applies only to errors a later attempt could fix.
    pub fn retry_strategy(&self) -> Arc<dyn RetryStrategy<ClientError>> {
        let retry = &self.retry;
        if retry.max_retries == 0 {
            return Arc::new(NoRetry);
        }
        Arc::new(RetryIf::new(
            ExponentialBackoff::new(
                retry.max_retries,
                retry.initial_backoff_ms,
                retry.max_backoff_ms,
            ),
            ClientError::is_retryable,
        ))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(self.artifact_paths())
            .with_workers(self.concurrency.workers)
            .with_retry(self.retry_strategy())
            .with_failure_policy(self.failure_policy)
    }
}
