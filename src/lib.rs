//! Call Handoff - call presentation backgrounding orchestrator
//!
//! When a call arrives, the Call UI Controller asks the orchestrator to get the
//! app out of the way so the host's native telephony UI can take over. The
//! orchestrator picks one of several backgrounding strategies, bounds it with a
//! deadline, reports the outcome and keeps success metrics that steer later
//! choices.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): history buffer, metrics, strategy selection
//! - **Application Layer** (`application`): the orchestrator and lifecycle observer
//! - **Adapters** (`adapters`): concrete strategies and the simulated host
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use call_handoff::adapters::host::SimulatedHost;
//! use call_handoff::adapters::strategies::default_registry;
//! use call_handoff::application::{BackgroundingOrchestrator, ProcessMemoryMonitor};
//! use call_handoff::domain::models::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let host = Arc::new(SimulatedHost::new());
//!     let orchestrator = BackgroundingOrchestrator::new(
//!         config.orchestrator,
//!         default_registry(host, &config.strategies),
//!         Arc::new(ProcessMemoryMonitor::new()),
//!     )?;
//!     orchestrator.initiate_backgrounding("call-1", None);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{
    BackgroundingOrchestrator, LifecycleObserver, LifecycleObserverConfig, ObserverHandle,
    ProcessMemoryMonitor,
};
pub use domain::errors::{BackgroundingError, BackgroundingErrorKind, BackgroundingResult};
pub use domain::models::{
    AttemptResult, BackgroundingRequest, CallId, Config, LastResult, MetricsSnapshot,
    OrchestratorConfig, StrategyConfig,
};
pub use domain::ports::{BackgroundingDelegate, BackgroundingStrategy, HostPlatform, MemoryProbe};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::StrategyRegistry;
