//! `simulate`: drive the orchestrator and the default strategies against a
//! simulated host and report what happened.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::adapters::host::{SimulatedHost, SimulatedHostConfig};
use crate::adapters::strategies::default_registry;
use crate::application::{
    BackgroundingOrchestrator, LifecycleObserver, LifecycleObserverConfig, ProcessMemoryMonitor,
};
use crate::cli::output::{format_attempts_table, format_metrics_table};
use crate::cli::SimulateArgs;
use crate::domain::errors::BackgroundingError;
use crate::domain::models::{
    AttemptResult, BackgroundingRequest, CallId, Config, MetricsSnapshot,
};
use crate::domain::ports::{BackgroundingDelegate, FixedMemoryProbe, HostPlatform, MemoryProbe};

/// Outcome of one simulated call.
#[derive(Debug, Clone, Serialize)]
pub struct CallOutcome {
    pub call_id: CallId,
    pub strategy: Option<String>,
    pub succeeded: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub calls: Vec<CallOutcome>,
    pub history: Vec<AttemptResult>,
    pub metrics: MetricsSnapshot,
    pub scene_requests: usize,
    pub nudged_calls: usize,
}

enum DelegateEvent {
    Succeeded(CallId),
    Failed(CallId, BackgroundingError),
}

/// Forwards terminal callbacks to the simulation loop.
struct ChannelDelegate {
    tx: mpsc::UnboundedSender<DelegateEvent>,
}

impl BackgroundingDelegate for ChannelDelegate {
    fn backgrounding_will_attempt_strategy(&self, call_id: &CallId, strategy: &str) {
        info!(call_id = %call_id, strategy, "attempting strategy");
    }

    fn backgrounding_did_succeed(&self, call_id: &CallId) {
        let _ = self.tx.send(DelegateEvent::Succeeded(call_id.clone()));
    }

    fn backgrounding_did_fail(&self, call_id: &CallId, error: &BackgroundingError) {
        let _ = self
            .tx
            .send(DelegateEvent::Failed(call_id.clone(), error.clone()));
    }
}

pub async fn execute(args: SimulateArgs, config: &Config, json: bool) -> Result<()> {
    let report = run(&args, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for call in &report.calls {
        match (&call.strategy, &call.error) {
            (Some(strategy), None) => {
                println!("{}: backgrounded via {strategy}", call.call_id);
            }
            (Some(strategy), Some(error)) => {
                println!("{}: {strategy} failed: {error}", call.call_id);
            }
            (None, error) => println!(
                "{}: rejected: {}",
                call.call_id,
                error.as_deref().unwrap_or("unknown")
            ),
        }
    }
    println!();
    println!("{}", format_attempts_table(&report.history));
    println!("{}", format_metrics_table(&report.metrics));
    Ok(())
}

/// Run the simulation and collect a report.
pub async fn run(args: &SimulateArgs, config: &Config) -> Result<SimulationReport> {
    let host = Arc::new(SimulatedHost::with_config(SimulatedHostConfig {
        supports_multiple_scenes: !args.single_scene,
        bridge_installed: !args.no_bridge,
        window_refuses: args.window_refuses,
        background_tasks_refused: args.refuse_background_tasks,
        latency: Duration::from_millis(args.latency_ms),
        ..Default::default()
    }));

    let memory_probe: Arc<dyn MemoryProbe> = match args.resident_mb {
        Some(mb) => Arc::new(FixedMemoryProbe::new(mb)),
        None => Arc::new(ProcessMemoryMonitor::new()),
    };

    let orchestrator = BackgroundingOrchestrator::new(
        config.orchestrator.clone(),
        default_registry(host.clone(), &config.strategies),
        memory_probe,
    )
    .context("Failed to create backgrounding orchestrator")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    orchestrator.set_delegate(Arc::new(ChannelDelegate { tx }));

    let observer = LifecycleObserver::new(
        orchestrator.clone(),
        host.subscribe_lifecycle(),
        LifecycleObserverConfig::from_orchestrator_config(&config.orchestrator),
    )
    .start();

    // The outer timeout always resolves the attempt; the slack covers delegate delivery.
    let wait_limit = config.orchestrator.backgrounding_timeout() + Duration::from_secs(1);
    let mut calls = Vec::with_capacity(args.calls);

    for index in 1..=args.calls {
        let call_id = CallId::new(format!("sim-call-{index}"));
        let mut request = BackgroundingRequest::new(call_id.clone());
        request.preferred_strategy.clone_from(&args.preferred);

        let strategy = match orchestrator.try_initiate_backgrounding(request) {
            Ok(strategy) => strategy,
            Err(error) => {
                warn!(call_id = %call_id, %error, "backgrounding request rejected");
                calls.push(CallOutcome {
                    call_id,
                    strategy: None,
                    succeeded: false,
                    error: Some(error.to_string()),
                });
                continue;
            }
        };

        let error = wait_for_outcome(&mut rx, &call_id, wait_limit)
            .await
            .with_context(|| format!("No outcome delivered for {call_id}"))?;

        calls.push(CallOutcome {
            call_id,
            strategy: Some(strategy),
            succeeded: error.is_none(),
            error: error.map(|e| e.to_string()),
        });
    }

    observer.shutdown().await?;

    Ok(SimulationReport {
        calls,
        history: orchestrator.recent_results(),
        metrics: orchestrator.metrics_snapshot(),
        scene_requests: host.scene_requests(),
        nudged_calls: host.nudged_calls().len(),
    })
}

/// Wait for the terminal callback for `call_id`. `Some(error)` on failure.
async fn wait_for_outcome(
    rx: &mut mpsc::UnboundedReceiver<DelegateEvent>,
    call_id: &CallId,
    limit: Duration,
) -> Result<Option<BackgroundingError>> {
    let outcome = tokio::time::timeout(limit, async {
        while let Some(event) = rx.recv().await {
            match event {
                DelegateEvent::Succeeded(id) if &id == call_id => return Some(None),
                DelegateEvent::Failed(id, error) if &id == call_id => return Some(Some(error)),
                _ => {}
            }
        }
        None
    })
    .await
    .context("timed out waiting for delegate callback")?;

    outcome.context("delegate channel closed")
}
