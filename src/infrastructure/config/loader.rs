use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_concurrent_operations: {0}. Must be at least 1")]
    InvalidMaxConcurrentOperations(usize),

    #[error("Invalid backgrounding_timeout_ms: {0}. Must be positive")]
    InvalidBackgroundingTimeout(u64),

    #[error("Invalid max_results_to_retain: {0}. Must be at least 1")]
    InvalidMaxResults(usize),

    #[error("Invalid metrics_retention_days: {0}. Must be at least 1")]
    InvalidRetention(u32),

    #[error("Invalid memory_pressure_threshold_mb: {0}. Must be positive")]
    InvalidMemoryThreshold(u64),

    #[error("Invalid metrics_sweep_interval_secs: {0}. Must be positive")]
    InvalidSweepInterval(u64),

    #[error(
        "Invalid strategy sub_timeout_ms ({0}): must be less than backgrounding_timeout_ms ({1})"
    )]
    InvalidSubTimeout(u64, u64),

    #[error(
        "Invalid strategy background_task_hold_ms ({0}): must be less than sub_timeout_ms ({1})"
    )]
    InvalidHoldWindow(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .call-handoff/config.yaml
    /// 3. .call-handoff/local.yaml (optional local overrides)
    /// 4. Environment variables (CALL_HANDOFF_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file. Environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Self::env())
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".call-handoff/config.yaml"))
            .merge(Yaml::file(".call-handoff/local.yaml"))
            .merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed("CALL_HANDOFF_").split("__")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let orchestrator = &config.orchestrator;

        if orchestrator.max_concurrent_operations == 0 {
            return Err(ConfigError::InvalidMaxConcurrentOperations(0));
        }
        if orchestrator.backgrounding_timeout_ms == 0 {
            return Err(ConfigError::InvalidBackgroundingTimeout(0));
        }
        if orchestrator.max_results_to_retain == 0 {
            return Err(ConfigError::InvalidMaxResults(0));
        }
        if orchestrator.metrics_retention_days == 0 {
            return Err(ConfigError::InvalidRetention(0));
        }
        if orchestrator.memory_pressure_threshold_mb == 0 {
            return Err(ConfigError::InvalidMemoryThreshold(0));
        }
        if orchestrator.metrics_sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidSweepInterval(0));
        }

        // A sub-call may not outlive the attempt it belongs to.
        if config.strategies.sub_timeout_ms >= orchestrator.backgrounding_timeout_ms {
            return Err(ConfigError::InvalidSubTimeout(
                config.strategies.sub_timeout_ms,
                orchestrator.backgrounding_timeout_ms,
            ));
        }

        // The hold runs inside the strategy's sub-timeout.
        if config.strategies.background_task_hold_ms >= config.strategies.sub_timeout_ms {
            return Err(ConfigError::InvalidHoldWindow(
                config.strategies.background_task_hold_ms,
                config.strategies.sub_timeout_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
