//! Fade the window and suspend input so the telephony UI is unobstructed.
//!
//! Needs no special entitlement but is visually intrusive and can race with
//! the host's own presentation. Only runs while the app is foreground-active.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::bounded;
use crate::domain::errors::{BackgroundingError, BackgroundingResult};
use crate::domain::models::{AppLifecyclePhase, CallId, WindowPresentation};
use crate::domain::ports::{BackgroundingStrategy, HostPlatform};

pub struct WindowMinimizationStrategy {
    host: Arc<dyn HostPlatform>,
    sub_timeout: Duration,
}

impl WindowMinimizationStrategy {
    pub const NAME: &'static str = "window_minimization";

    pub fn new(host: Arc<dyn HostPlatform>, sub_timeout: Duration) -> Self {
        Self { host, sub_timeout }
    }
}

#[async_trait]
impl BackgroundingStrategy for WindowMinimizationStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.host.lifecycle_phase() == AppLifecyclePhase::ForegroundActive
    }

    async fn execute(&self, call_id: &CallId) -> BackgroundingResult<()> {
        debug!(call_id = %call_id, "minimizing window");
        bounded(
            self.sub_timeout,
            self.host
                .apply_window_presentation(WindowPresentation::minimized()),
        )
        .await
        .map_err(|err| BackgroundingError::WindowInteractionFailed(err.to_string()))
    }
}
