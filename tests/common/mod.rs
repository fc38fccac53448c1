//! Common test utilities for integration tests
//!
//! Scripted strategies, a recording delegate and orchestrator builders shared
//! across the integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use call_handoff::domain::errors::{BackgroundingError, BackgroundingResult};
use call_handoff::domain::models::{CallId, OrchestratorConfig};
use call_handoff::domain::ports::{
    BackgroundingDelegate, BackgroundingStrategy, FixedMemoryProbe,
};
use call_handoff::{BackgroundingOrchestrator, StrategyRegistry};

/// What a scripted strategy does when executed.
#[derive(Debug, Clone)]
pub enum Script {
    Succeed { after: Duration },
    Fail { after: Duration, error: BackgroundingError },
    Hang,
}

/// Strategy whose behaviour is fixed by the test.
pub struct ScriptedStrategy {
    name: String,
    available: bool,
    script: Mutex<Script>,
    executions: AtomicUsize,
}

impl ScriptedStrategy {
    pub fn new(name: &str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            available: true,
            script: Mutex::new(script),
            executions: AtomicUsize::new(0),
        })
    }

    pub fn unavailable(name: &str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            available: false,
            script: Mutex::new(script),
            executions: AtomicUsize::new(0),
        })
    }

    pub fn succeeding(name: &str) -> Arc<Self> {
        Self::new(
            name,
            Script::Succeed {
                after: Duration::from_millis(10),
            },
        )
    }

    pub fn failing(name: &str, error: BackgroundingError) -> Arc<Self> {
        Self::new(
            name,
            Script::Fail {
                after: Duration::from_millis(10),
                error,
            },
        )
    }

    pub fn hanging(name: &str) -> Arc<Self> {
        Self::new(name, Script::Hang)
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackgroundingStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn execute(&self, _call_id: &CallId) -> BackgroundingResult<()> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Succeed { after } => {
                tokio::time::sleep(after).await;
                Ok(())
            }
            Script::Fail { after, error } => {
                tokio::time::sleep(after).await;
                Err(error)
            }
            Script::Hang => std::future::pending().await,
        }
    }
}

/// A delegate callback, as seen by the Call UI Controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DelegateEvent {
    WillAttempt(CallId, String),
    Succeeded(CallId),
    Failed(CallId, BackgroundingError),
}

impl DelegateEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::WillAttempt(..))
    }
}

/// Delegate forwarding every callback into a channel.
pub struct RecordingDelegate {
    tx: mpsc::UnboundedSender<DelegateEvent>,
}

impl RecordingDelegate {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<DelegateEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl BackgroundingDelegate for RecordingDelegate {
    fn backgrounding_will_attempt_strategy(&self, call_id: &CallId, strategy: &str) {
        let _ = self
            .tx
            .send(DelegateEvent::WillAttempt(call_id.clone(), strategy.to_string()));
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

/// Receive the next terminal callback, skipping `WillAttempt`.
pub async fn next_terminal(rx: &mut mpsc::UnboundedReceiver<DelegateEvent>) -> DelegateEvent {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("timed out waiting for delegate callback")
            .expect("delegate channel closed");
        if event.is_terminal() {
            return event;
        }
    }
}

pub fn registry(strategies: Vec<Arc<ScriptedStrategy>>) -> StrategyRegistry {
    strategies
        .into_iter()
        .fold(StrategyRegistry::new(), |registry, strategy| {
            registry.register(strategy)
        })
}

/// Orchestrator with default config, low memory use and a recording delegate.
pub fn orchestrator_with(
    config: OrchestratorConfig,
    strategies: Vec<Arc<ScriptedStrategy>>,
) -> (BackgroundingOrchestrator, mpsc::UnboundedReceiver<DelegateEvent>) {
    let orchestrator = BackgroundingOrchestrator::new(
        config,
        registry(strategies),
        Arc::new(FixedMemoryProbe::new(64)),
    )
    .expect("orchestrator should build");
    let (delegate, rx) = RecordingDelegate::new();
    orchestrator.set_delegate(delegate);
    (orchestrator, rx)
}

pub fn orchestrator(
    strategies: Vec<Arc<ScriptedStrategy>>,
) -> (BackgroundingOrchestrator, mpsc::UnboundedReceiver<DelegateEvent>) {
    orchestrator_with(OrchestratorConfig::default(), strategies)
}

/// Initializes a tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Poll `predicate` every 10ms until it holds or `timeout_ms` elapses.
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    predicate()
}
