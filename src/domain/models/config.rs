use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for call-handoff
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Admission, timeout and history settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Per-strategy tuning
    #[serde(default)]
    pub strategies: StrategyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrchestratorConfig {
    /// Admission ceiling for concurrently active operations
    #[serde(default = "default_max_concurrent_operations")]
    pub max_concurrent_operations: usize,

    /// Per-attempt deadline in milliseconds
    #[serde(default = "default_backgrounding_timeout_ms")]
    pub backgrounding_timeout_ms: u64,

    /// History pruning horizon in days
    #[serde(default = "default_metrics_retention_days")]
    pub metrics_retention_days: u32,

    /// History buffer cap
    #[serde(default = "default_max_results_to_retain")]
    pub max_results_to_retain: usize,

    /// Resident memory above which admission is refused
    #[serde(default = "default_memory_pressure_threshold_mb")]
    pub memory_pressure_threshold_mb: u64,

    /// Period of the history sweep in seconds
    #[serde(default = "default_metrics_sweep_interval_secs")]
    pub metrics_sweep_interval_secs: u64,
}

const fn default_max_concurrent_operations() -> usize {
    3
}

const fn default_backgrounding_timeout_ms() -> u64 {
    2000
}

const fn default_metrics_retention_days() -> u32 {
    7
}

const fn default_max_results_to_retain() -> usize {
    100
}

const fn default_memory_pressure_threshold_mb() -> u64 {
    200
}

const fn default_metrics_sweep_interval_secs() -> u64 {
    30
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_operations: default_max_concurrent_operations(),
            backgrounding_timeout_ms: default_backgrounding_timeout_ms(),
            metrics_retention_days: default_metrics_retention_days(),
            max_results_to_retain: default_max_results_to_retain(),
            memory_pressure_threshold_mb: default_memory_pressure_threshold_mb(),
            metrics_sweep_interval_secs: default_metrics_sweep_interval_secs(),
        }
    }
}

impl OrchestratorConfig {
    pub fn backgrounding_timeout(&self) -> Duration {
        Duration::from_millis(self.backgrounding_timeout_ms)
    }

    pub fn retention_horizon(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.metrics_retention_days))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_sweep_interval_secs)
    }
}

/// Strategy tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StrategyConfig {
    /// Bound on each host call a strategy makes, in milliseconds
    #[serde(default = "default_sub_timeout_ms")]
    pub sub_timeout_ms: u64,

    /// How long the background task extension holds its grant
    #[serde(default = "default_background_task_hold_ms")]
    pub background_task_hold_ms: u64,
}

const fn default_sub_timeout_ms() -> u64 {
    1500
}

const fn default_background_task_hold_ms() -> u64 {
    500
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            sub_timeout_ms: default_sub_timeout_ms(),
            background_task_hold_ms: default_background_task_hold_ms(),
        }
    }
}

impl StrategyConfig {
    pub fn sub_timeout(&self) -> Duration {
        Duration::from_millis(self.sub_timeout_ms)
    }

    pub fn background_task_hold(&self) -> Duration {
        Duration::from_millis(self.background_task_hold_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
