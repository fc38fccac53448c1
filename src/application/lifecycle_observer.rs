//! Host lifecycle observer.
//!
//! Reacts to lifecycle signals from the host and runs the periodic history
//! sweep:
//! - Entered background: void all active operations (recorded as abandoned)
//! - Entering foreground: revalidate the active set
//! - Memory warning: trim history to half its cap
//! - Every sweep interval: prune history past the retention horizon

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::orchestrator::BackgroundingOrchestrator;
use crate::domain::models::{LifecycleSignal, OrchestratorConfig};

/// Configuration for the lifecycle observer.
#[derive(Debug, Clone)]
pub struct LifecycleObserverConfig {
    /// Interval between history sweeps.
    pub sweep_interval: Duration,
    /// Slack past the backgrounding timeout before an operation counts as stale.
    pub revalidation_grace: Duration,
}

impl Default for LifecycleObserverConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
            revalidation_grace: Duration::from_secs(1),
        }
    }
}

impl LifecycleObserverConfig {
    pub fn from_orchestrator_config(config: &OrchestratorConfig) -> Self {
        Self {
            sweep_interval: config.sweep_interval(),
            ..Default::default()
        }
    }
}

/// Counters describing what the observer has done.
#[derive(Debug, Clone, Default)]
pub struct ObserverStatus {
    pub running: bool,
    pub sweeps_completed: u64,
    pub entries_pruned: u64,
    pub background_transitions: u64,
    pub foreground_transitions: u64,
    pub memory_warnings: u64,
    pub operations_abandoned: u64,
    pub last_sweep_at: Option<DateTime<Utc>>,
}

/// Handle to a running observer.
pub struct ObserverHandle {
    shutdown_tx: broadcast::Sender<()>,
    status: Arc<RwLock<ObserverStatus>>,
    join: JoinHandle<()>,
}

impl ObserverHandle {
    pub async fn status(&self) -> ObserverStatus {
        self.status.read().await.clone()
    }

    /// Stop the observer and wait for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        info!("Initiating lifecycle observer shutdown");
        // The loop may already have exited on a closed signal stream.
        let _ = self.shutdown_tx.send(());
        self.join
            .await
            .context("lifecycle observer task panicked")
    }
}

/// Drives orchestrator housekeeping from host lifecycle signals.
pub struct LifecycleObserver {
    orchestrator: BackgroundingOrchestrator,
    signals: broadcast::Receiver<LifecycleSignal>,
    config: LifecycleObserverConfig,
}

impl LifecycleObserver {
    pub fn new(
        orchestrator: BackgroundingOrchestrator,
        signals: broadcast::Receiver<LifecycleSignal>,
        config: LifecycleObserverConfig,
    ) -> Self {
        Self {
            orchestrator,
            signals,
            config,
        }
    }

    /// Spawn the observer loop on the current runtime.
    pub fn start(self) -> ObserverHandle {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let status = Arc::new(RwLock::new(ObserverStatus {
            running: true,
            ..Default::default()
        }));
        let task_status = Arc::clone(&status);

        let Self {
            orchestrator,
            mut signals,
            config,
        } = self;

        let join = tokio::spawn(async move {
            let period = config.sweep_interval;
            let mut sweep = interval_at(Instant::now() + period, period);
            sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(sweep_interval_secs = period.as_secs(), "Lifecycle observer started");

            loop {
                tokio::select! {
                    _ = sweep.tick() => {
                        let pruned = orchestrator.sweep_history();
                        let mut status = task_status.write().await;
                        status.sweeps_completed += 1;
                        status.entries_pruned += pruned as u64;
                        status.last_sweep_at = Some(Utc::now());
                    }

                    signal = signals.recv() => match signal {
                        Ok(signal) => {
                            handle_signal(&orchestrator, &config, signal, &task_status).await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "lifecycle observer lagged behind host signals");
                        }
                        Err(RecvError::Closed) => {
                            info!("Host lifecycle stream closed");
                            break;
                        }
                    },

                    _ = shutdown_rx.recv() => {
                        info!("Lifecycle observer shutting down");
                        break;
                    }
                }
            }

            task_status.write().await.running = false;
            info!("Lifecycle observer stopped");
        });

        ObserverHandle {
            shutdown_tx,
            status,
            join,
        }
    }
}

async fn handle_signal(
    orchestrator: &BackgroundingOrchestrator,
    config: &LifecycleObserverConfig,
    signal: LifecycleSignal,
    status: &RwLock<ObserverStatus>,
) {
    debug!(?signal, "lifecycle signal received");
    match signal {
        LifecycleSignal::DidEnterBackground => {
            let abandoned = orchestrator.abandon_all_operations();
            let mut status = status.write().await;
            status.background_transitions += 1;
            status.operations_abandoned += abandoned as u64;
        }
        LifecycleSignal::WillEnterForeground => {
            let stale = orchestrator.revalidate_operations(config.revalidation_grace);
            let mut status = status.write().await;
            status.foreground_transitions += 1;
            status.operations_abandoned += stale as u64;
        }
        LifecycleSignal::MemoryWarning => {
            orchestrator.trim_history_for_memory_warning();
            status.write().await.memory_warnings += 1;
        }
    }
}
