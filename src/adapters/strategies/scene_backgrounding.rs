//! Ask the host to background the current UI scene.
//!
//! Cleanest handoff where supported; requires multi-scene support.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::bounded;
use crate::domain::errors::{BackgroundingError, BackgroundingResult, HostError};
use crate::domain::models::CallId;
use crate::domain::ports::{BackgroundingStrategy, HostPlatform};

pub struct SceneBackgroundingStrategy {
    host: Arc<dyn HostPlatform>,
    sub_timeout: Duration,
}

impl SceneBackgroundingStrategy {
    pub const NAME: &'static str = "scene_backgrounding";

    pub fn new(host: Arc<dyn HostPlatform>, sub_timeout: Duration) -> Self {
        Self { host, sub_timeout }
    }
}

#[async_trait]
impl BackgroundingStrategy for SceneBackgroundingStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.host.supports_multiple_scenes()
    }

    async fn execute(&self, call_id: &CallId) -> BackgroundingResult<()> {
        debug!(call_id = %call_id, "requesting scene backgrounding");
        bounded(self.sub_timeout, self.host.request_scene_backgrounding())
            .await
            .map_err(|err| match err {
                HostError::NoForegroundScene => {
                    BackgroundingError::SceneStateInvalid(err.to_string())
                }
                other => BackgroundingError::SystemBackgroundingBlocked(other.to_string()),
            })
    }
}
