//! Engine configuration.
//!
//! Defaults suit a single host. Override via environment variables or a
//! configuration file section deserialized into [`EngineConfig`].

use serde::{Deserialize, Serialize};

/// Default cap on data rows per upload.
pub const DEFAULT_MAX_ROWS: usize = 50_000;

/// Upper bound on the default worker count.
const DEFAULT_WORKER_CAP: usize = 8;

/// Tunables for batch processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Threads in the row-computation pool.
    pub worker_threads: usize,
    /// Uploads with more non-blank data rows than this are rejected.
    pub max_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            worker_threads: available.min(DEFAULT_WORKER_CAP),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by the environment.
    ///
    /// Variables:
    /// - `COMPA_WORKER_THREADS` (default: available parallelism, at most 8)
    /// - `COMPA_MAX_ROWS` (default: 50000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            worker_threads: env_positive("COMPA_WORKER_THREADS", self.worker_threads)?,
            max_rows: env_positive("COMPA_MAX_ROWS", self.max_rows)?,
        })
    }

    /// Reject zero-sized settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::NotPositive("worker_threads".to_string()));
        }
        if self.max_rows == 0 {
            return Err(ConfigError::NotPositive("max_rows".to_string()));
        }
        Ok(())
    }
}

fn env_positive(var: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => parse_positive(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_positive(var: &str, raw: &str) -> Result<usize, ConfigError> {
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw.to_string()))?;
    if value == 0 {
        return Err(ConfigError::NotPositive(var.to_string()));
    }
    Ok(value)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
    #[error("{0} must be greater than zero")]
    NotPositive(String),
}
