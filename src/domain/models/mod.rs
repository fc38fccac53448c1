//! Domain models for call presentation backgrounding.

pub mod attempt;
pub mod call;
pub mod config;
pub mod host;
pub mod metrics;

pub use attempt::{AdmissionRejection, AttemptResult, LastResult};
pub use call::{BackgroundingRequest, CallId};
pub use config::{Config, LoggingConfig, OrchestratorConfig, StrategyConfig};
pub use host::{AppLifecyclePhase, BackgroundTaskGrant, LifecycleSignal, WindowPresentation};
pub use metrics::MetricsSnapshot;
