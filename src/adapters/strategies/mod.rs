//! Concrete backgrounding strategies.
//!
//! Each strategy wraps host primitives from a shared `HostPlatform` and bounds
//! every host call with its own sub-timeout.

pub mod background_task_extension;
pub mod native_ui_nudge;
pub mod scene_backgrounding;
pub mod window_minimization;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::HostError;
use crate::domain::models::StrategyConfig;
use crate::domain::ports::HostPlatform;
use crate::services::StrategyRegistry;

pub use background_task_extension::SystemBackgroundTaskExtensionStrategy;
pub use native_ui_nudge::NativeUiProviderNudgeStrategy;
pub use scene_backgrounding::SceneBackgroundingStrategy;
pub use window_minimization::WindowMinimizationStrategy;

/// Build the standard strategy set in registration order.
///
/// Window minimization comes first and wins ties, but depends on the
/// lifecycle phase. The nudge and the background task extension are always
/// available, so selection never has to fall back to the last resort.
pub fn default_registry(host: Arc<dyn HostPlatform>, config: &StrategyConfig) -> StrategyRegistry {
    let sub_timeout = config.sub_timeout();
    StrategyRegistry::new()
        .register(Arc::new(WindowMinimizationStrategy::new(
            Arc::clone(&host),
            sub_timeout,
        )))
        .register(Arc::new(SceneBackgroundingStrategy::new(
            Arc::clone(&host),
            sub_timeout,
        )))
        .register(Arc::new(NativeUiProviderNudgeStrategy::new(
            Arc::clone(&host),
            sub_timeout,
        )))
        .register(Arc::new(SystemBackgroundTaskExtensionStrategy::new(
            host,
            sub_timeout,
            config.background_task_hold(),
        )))
}

/// Run a host call, giving up after `limit`.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, HostError>
where
    F: Future<Output = Result<T, HostError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(HostError::Unresponsive(
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}
