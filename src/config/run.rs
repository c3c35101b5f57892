//! Run settings: batch size, retry budget, and failure policy.
//!
//! Defaults reproduce the benchmark harness (15 items per batch, 6 attempts,
//! 1..60s backoff). A TOML file can override any subset of them:
//!
//! ```toml
//! batch_size = 10
//! failure_policy = "fail_batch"
//!
//! [retry]
//! max_attempts = 4
//! max_delay_secs = 30.0
//! ```

use crate::dispatch::FailurePolicy;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 15;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    pub batch_size: usize,
    pub failure_policy: FailurePolicy,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_secs: f64,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            failure_policy: FailurePolicy::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay_secs: 1.0,
            min_delay_secs: 1.0,
            max_delay_secs: 60.0,
        }
    }
}

impl RunSettings {
    /// Load settings from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read run settings {}: {e}", path.display()))
        })?;
        let settings: RunSettings = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("bad run settings {}: {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        self.retry_policy().map(|_| ())
    }

    /// Build the retry policy described by these settings.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let r = &self.retry;
        RetryPolicy::new(
            r.max_attempts,
            delay("base_delay_secs", r.base_delay_secs)?,
            delay("min_delay_secs", r.min_delay_secs)?,
            delay("max_delay_secs", r.max_delay_secs)?,
        )
    }
}

/// Negative, non-finite, and out-of-range values are config errors.
fn delay(name: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| Error::Config(format!("{name}: {e}")))
}
