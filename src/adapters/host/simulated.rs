//! In-process simulation of the host platform.
//!
//! Drives the strategies without a real operating system: used by the
//! `simulate` command and by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::domain::errors::HostError;
use crate::domain::models::{
    AppLifecyclePhase, BackgroundTaskGrant, CallId, LifecycleSignal, WindowPresentation,
};
use crate::domain::ports::HostPlatform;

/// Behaviour of a simulated host.
#[derive(Debug, Clone)]
pub struct SimulatedHostConfig {
    /// Initial lifecycle phase
    pub phase: AppLifecyclePhase,
    pub supports_multiple_scenes: bool,
    pub bridge_installed: bool,
    pub window_refuses: bool,
    pub scene_refuses: bool,
    pub background_tasks_refused: bool,
    /// Lifetime of each background task grant
    pub grant_expires_in: Duration,
    /// Delay before every async host call resolves
    pub latency: Duration,
}

impl Default for SimulatedHostConfig {
    fn default() -> Self {
        Self {
            phase: AppLifecyclePhase::ForegroundActive,
            supports_multiple_scenes: true,
            bridge_installed: true,
            window_refuses: false,
            scene_refuses: false,
            background_tasks_refused: false,
            grant_expires_in: Duration::from_secs(30),
            latency: Duration::ZERO,
        }
    }
}

#[derive(Debug)]
struct HostState {
    phase: AppLifecyclePhase,
    window: Option<WindowPresentation>,
    scene_requests: usize,
    nudged: Vec<CallId>,
    grants: HashMap<u64, Instant>,
    next_grant_id: u64,
}

/// Simulated host platform.
pub struct SimulatedHost {
    config: SimulatedHostConfig,
    state: Mutex<HostState>,
    lifecycle_tx: broadcast::Sender<LifecycleSignal>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::with_config(SimulatedHostConfig::default())
    }

    pub fn with_config(config: SimulatedHostConfig) -> Self {
        let (lifecycle_tx, _) = broadcast::channel(32);
        Self {
            state: Mutex::new(HostState {
                phase: config.phase,
                window: None,
                scene_requests: 0,
                nudged: Vec::new(),
                grants: HashMap::new(),
                next_grant_id: 1,
            }),
            config,
            lifecycle_tx,
        }
    }

    pub fn set_lifecycle_phase(&self, phase: AppLifecyclePhase) {
        self.state().phase = phase;
    }

    /// Deliver a lifecycle signal, updating the phase the way a host would.
    /// Returns the number of subscribers reached.
    pub fn emit(&self, signal: LifecycleSignal) -> usize {
        match signal {
            LifecycleSignal::DidEnterBackground => {
                self.set_lifecycle_phase(AppLifecyclePhase::Background);
            }
            LifecycleSignal::WillEnterForeground => {
                self.set_lifecycle_phase(AppLifecyclePhase::ForegroundActive);
            }
            LifecycleSignal::MemoryWarning => {}
        }
        self.lifecycle_tx.send(signal).unwrap_or(0)
    }

    /// Last presentation applied to the window.
    pub fn window_presentation(&self) -> Option<WindowPresentation> {
        self.state().window
    }

    pub fn scene_requests(&self) -> usize {
        self.state().scene_requests
    }

    pub fn nudged_calls(&self) -> Vec<CallId> {
        self.state().nudged.clone()
    }

    /// Grants acquired and not yet released.
    pub fn open_grants(&self) -> usize {
        self.state().grants.len()
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostPlatform for SimulatedHost {
    fn lifecycle_phase(&self) -> AppLifecyclePhase {
        self.state().phase
    }

    fn supports_multiple_scenes(&self) -> bool {
        self.config.supports_multiple_scenes
    }

    async fn apply_window_presentation(
        &self,
        presentation: WindowPresentation,
    ) -> Result<(), HostError> {
        self.simulate_latency().await;
        if self.config.window_refuses {
            return Err(HostError::Refused("window is locked by the host".to_string()));
        }
        self.state().window = Some(presentation);
        Ok(())
    }

    async fn request_scene_backgrounding(&self) -> Result<(), HostError> {
        self.simulate_latency().await;
        let mut state = self.state();
        if state.phase == AppLifecyclePhase::Background {
            return Err(HostError::NoForegroundScene);
        }
        if self.config.scene_refuses {
            return Err(HostError::Refused("scene session is pinned".to_string()));
        }
        state.scene_requests += 1;
        Ok(())
    }

    async fn post_native_ui_nudge(&self, call_id: &CallId) -> Result<(), HostError> {
        self.simulate_latency().await;
        if !self.config.bridge_installed {
            return Err(HostError::BridgeMissing);
        }
        self.state().nudged.push(call_id.clone());
        Ok(())
    }

    async fn begin_background_task(&self, _name: &str) -> Result<BackgroundTaskGrant, HostError> {
        self.simulate_latency().await;
        if self.config.background_tasks_refused {
            return Err(HostError::Refused(
                "background execution budget exhausted".to_string(),
            ));
        }
        let mut state = self.state();
        let id = state.next_grant_id;
        state.next_grant_id += 1;
        state
            .grants
            .insert(id, Instant::now() + self.config.grant_expires_in);
        Ok(BackgroundTaskGrant {
            id,
            expires_in: self.config.grant_expires_in,
        })
    }

    async fn end_background_task(&self, grant_id: u64) -> Result<(), HostError> {
        self.simulate_latency().await;
        match self.state().grants.remove(&grant_id) {
            Some(expires_at) if Instant::now() < expires_at => Ok(()),
            _ => Err(HostError::GrantExpired(grant_id)),
        }
    }

    fn subscribe_lifecycle(&self) -> broadcast::Receiver<LifecycleSignal> {
        self.lifecycle_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_updates_phase_and_notifies() {
        let host = SimulatedHost::new();
        let mut signals = host.subscribe_lifecycle();

        assert_eq!(host.emit(LifecycleSignal::DidEnterBackground), 1);
        assert_eq!(host.lifecycle_phase(), AppLifecyclePhase::Background);
        assert_eq!(signals.recv().await.unwrap(), LifecycleSignal::DidEnterBackground);

        host.emit(LifecycleSignal::WillEnterForeground);
        assert_eq!(host.lifecycle_phase(), AppLifecyclePhase::ForegroundActive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_grant_rejects_release() {
        let host = SimulatedHost::with_config(SimulatedHostConfig {
            grant_expires_in: Duration::from_millis(10),
            ..Default::default()
        });

        let grant = host.begin_background_task("test").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            host.end_background_task(grant.id).await,
            Err(HostError::GrantExpired(grant.id))
        );
        assert_eq!(host.open_grants(), 0);
    }
}
