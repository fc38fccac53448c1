//! Nudge the native telephony UI bridge to re-assert itself.
//!
//! Fire-and-forget: success means the nudge was posted, not that the native
//! UI came forward. Always available; used as a cheap fallback signal.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::bounded;
use crate::domain::errors::{BackgroundingError, BackgroundingResult, HostError};
use crate::domain::models::CallId;
use crate::domain::ports::{BackgroundingStrategy, HostPlatform};

pub struct NativeUiProviderNudgeStrategy {
    host: Arc<dyn HostPlatform>,
    sub_timeout: Duration,
}

impl NativeUiProviderNudgeStrategy {
    pub const NAME: &'static str = "native_ui_provider_nudge";

    pub fn new(host: Arc<dyn HostPlatform>, sub_timeout: Duration) -> Self {
        Self { host, sub_timeout }
    }
}

#[async_trait]
impl BackgroundingStrategy for NativeUiProviderNudgeStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn execute(&self, call_id: &CallId) -> BackgroundingResult<()> {
        debug!(call_id = %call_id, "posting native UI nudge");
        bounded(self.sub_timeout, self.host.post_native_ui_nudge(call_id))
            .await
            .map_err(|err| match err {
                HostError::BridgeMissing => {
                    BackgroundingError::NativeUiProviderUnavailable(err.to_string())
                }
                other => BackgroundingError::SystemBackgroundingBlocked(other.to_string()),
            })
    }
}
