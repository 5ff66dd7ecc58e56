//! CLI configuration.
//!
//! Loaded from an optional YAML file (`--config`), then overridden by the
//! environment. Every key is optional:
//!
//! ```yaml
//! default_scale: FIVE_POINT
//! log_format: json
//! engine:
//!   worker_threads: 4
//!   max_rows: 20000
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use compa_core::{PerformanceRatingScale, TenantContext, TenantId};
use compa_engine::EngineConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other:?}")),
        }
    }
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompaConfig {
    pub engine: EngineConfig,
    /// Scale used when a command does not pass `--scale`.
    pub default_scale: PerformanceRatingScale,
    pub log_format: LogFormat,
}

impl CompaConfig {
    /// Read the file (if any) and apply environment overrides.
    ///
    /// Variables:
    /// - `COMPA_WORKER_THREADS`, `COMPA_MAX_ROWS` (see [`EngineConfig`])
    /// - `COMPA_DEFAULT_SCALE` (`FIVE_POINT` | `THREE_POINT`)
    /// - `COMPA_LOG_FORMAT` (`text` | `json`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        let engine = self.engine.with_env_overrides()?;
        let default_scale = match std::env::var("COMPA_DEFAULT_SCALE") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!("COMPA_DEFAULT_SCALE: {e}"))?,
            Err(_) => self.default_scale,
        };
        let log_format = match std::env::var("COMPA_LOG_FORMAT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: String| anyhow::anyhow!("COMPA_LOG_FORMAT: {e}"))?,
            Err(_) => self.log_format,
        };
        Ok(Self {
            engine,
            default_scale,
            log_format,
        })
    }

    /// Tenant context for a command, with an optional scale override.
    pub fn tenant_context(
        &self,
        tenant: &str,
        scale: Option<PerformanceRatingScale>,
    ) -> Result<TenantContext> {
        let tenant_id = TenantId::new(tenant).context("invalid tenant")?;
        Ok(TenantContext::new(
            tenant_id,
            scale.unwrap_or(self.default_scale),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compa.yaml");
        std::fs::write(&path, "{}\n").unwrap();
        let config = CompaConfig::from_file(&path).unwrap();
        assert_eq!(config.default_scale, PerformanceRatingScale::FivePoint);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compa.yaml");
        std::fs::write(
            &path,
            "default_scale: THREE_POINT\nlog_format: json\nengine:\n  worker_threads: 2\n  max_rows: 10\n",
        )
        .unwrap();
        let config = CompaConfig::from_file(&path).unwrap();
        assert_eq!(config.default_scale, PerformanceRatingScale::ThreePoint);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.engine.worker_threads, 2);
        assert_eq!(config.engine.max_rows, 10);
    }

    #[test]
    fn zero_workers_in_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compa.yaml");
        std::fs::write(&path, "engine:\n  worker_threads: 0\n").unwrap();
        assert!(CompaConfig::from_file(&path).is_err());
    }

    #[test]
    fn missing_file_has_context() {
        let err = CompaConfig::from_file(Path::new("/nonexistent/compa.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }

    #[test]
    fn tenant_context_uses_default_scale() {
        let config = CompaConfig {
            default_scale: PerformanceRatingScale::ThreePoint,
            ..CompaConfig::default()
        };
        let ctx = config.tenant_context("acme", None).unwrap();
        assert_eq!(ctx.scale, PerformanceRatingScale::ThreePoint);
        let ctx = config
            .tenant_context("acme", Some(PerformanceRatingScale::FivePoint))
            .unwrap();
        assert_eq!(ctx.scale, PerformanceRatingScale::FivePoint);
        assert!(config.tenant_context("  ", None).is_err());
    }

    #[test]
    fn log_format_parses() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
