use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::errors::HostError;
use crate::domain::models::{
    AppLifecyclePhase, BackgroundTaskGrant, CallId, LifecycleSignal, WindowPresentation,
};

/// Port to the host operating system's presentation primitives.
///
/// Strategies call these to attempt a handoff; observers subscribe to the
/// lifecycle stream. Implementations own thread-correctness of the underlying
/// host APIs (for example hopping to a main/presentation thread).
#[async_trait]
pub trait HostPlatform: Send + Sync {
    /// Current lifecycle phase.
    fn lifecycle_phase(&self) -> AppLifecyclePhase;

    /// Whether the host supports multiple concurrent UI scenes.
    fn supports_multiple_scenes(&self) -> bool;

    /// Apply a window opacity/input state.
    async fn apply_window_presentation(
        &self,
        presentation: WindowPresentation,
    ) -> Result<(), HostError>;

    /// Ask the host to background or destroy the current foreground scene.
    async fn request_scene_backgrounding(&self) -> Result<(), HostError>;

    /// Post a notification asking the native telephony UI bridge to re-assert
    /// itself for `call_id`.
    async fn post_native_ui_nudge(&self, call_id: &CallId) -> Result<(), HostError>;

    /// Acquire a short-lived background execution grant.
    async fn begin_background_task(&self, name: &str) -> Result<BackgroundTaskGrant, HostError>;

    /// Release a grant. Fails with `HostError::GrantExpired` if the host
    /// already revoked it.
    async fn end_background_task(&self, grant_id: u64) -> Result<(), HostError>;

    /// Subscribe to lifecycle notifications.
    fn subscribe_lifecycle(&self) -> broadcast::Receiver<LifecycleSignal>;
}
