//! Call Presentation Backgrounding Orchestrator
//!
//! Single authority for "should we attempt, with what method, and did it work"
//! when handing a call off to the native telephony UI.
//!
//! # Concurrency
//!
//! - One `std::sync::Mutex` guards the active set and the result history.
//!   Critical sections never await and never call out.
//! - Each admitted attempt runs on its own tokio task. The strategy itself runs
//!   on a further task and reports through a oneshot channel raced against
//!   `tokio::time::timeout`; whichever fires first decides the result.
//! - Observable state is published through `watch` channels after the lock is
//!   released. Delegate callbacks go through the presentation queue.
//!
//! ```text
//! initiate_backgrounding ──► admit (memory gate, select, lock: dup/ceiling/insert)
//!                                   │
//!                                   ▼
//!                      attempt task: timeout(strategy task)
//!                                   │
//!                                   ▼
//!             complete (lock: remove/push) ──► watch channels ──► delegate
//! ```

use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::presentation::PresentationQueue;
use crate::domain::errors::{BackgroundingError, BackgroundingResult, ConcurrencyRejection};
use crate::domain::models::{
    AdmissionRejection, AttemptResult, BackgroundingRequest, CallId, LastResult, MetricsSnapshot,
    OrchestratorConfig,
};
use crate::domain::ports::{BackgroundingDelegate, BackgroundingStrategy, MemoryProbe};
use crate::services::{
    select_strategy, MetricsAggregator, ResultHistory, StrategyRegistry, StrategySelection,
};

/// Bookkeeping for one in-flight attempt.
#[derive(Debug, Clone)]
struct ActiveOperation {
    operation_id: Uuid,
    strategy_name: String,
    started_at: Instant,
}

struct SharedState {
    active: HashMap<CallId, ActiveOperation>,
    history: ResultHistory,
    /// Bumped on every mutation; orders publications from racing tasks.
    revision: u64,
}

impl SharedState {
    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

/// A watch channel that ignores publications older than the latest one sent.
struct Published<T> {
    tx: watch::Sender<T>,
    revision: AtomicU64,
}

impl<T: PartialEq> Published<T> {
    fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            revision: AtomicU64::new(0),
        }
    }

    fn publish(&self, revision: u64, value: T) {
        self.tx.send_if_modified(|current| {
            // The closure runs under the channel's write lock.
            if revision < self.revision.load(Ordering::Relaxed) {
                return false;
            }
            self.revision.store(revision, Ordering::Relaxed);
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

struct Admission {
    operation_id: Uuid,
    started_at: Instant,
    selection: StrategySelection,
}

struct OrchestratorInner {
    config: OrchestratorConfig,
    strategies: StrategyRegistry,
    memory_probe: Arc<dyn MemoryProbe>,
    state: Mutex<SharedState>,
    presentation: PresentationQueue,
    in_progress: Published<bool>,
    last_result: Published<Option<LastResult>>,
    metrics: Published<MetricsSnapshot>,
    runtime: Handle,
}

/// Handle to the long-lived backgrounding orchestrator.
///
/// Construct once at application start and clone the handle into the Call UI
/// Controller and the lifecycle observer; clones share all state.
///
/// # Examples
///
/// ```no_run
/// use call_handoff::adapters::host::SimulatedHost;
/// use call_handoff::adapters::strategies::default_registry;
/// use call_handoff::application::{BackgroundingOrchestrator, ProcessMemoryMonitor};
/// use call_handoff::domain::models::{OrchestratorConfig, StrategyConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let host = Arc::new(SimulatedHost::new());
/// let orchestrator = BackgroundingOrchestrator::new(
///     OrchestratorConfig::default(),
///     default_registry(host, &StrategyConfig::default()),
///     Arc::new(ProcessMemoryMonitor::new()),
/// )?;
///
/// if !orchestrator.initiate_backgrounding("call-1", None) {
///     // show the in-app call interface
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BackgroundingOrchestrator {
    inner: Arc<OrchestratorInner>,
}

impl BackgroundingOrchestrator {
    /// Create an orchestrator. Must be called from within a tokio runtime; the
    /// runtime is captured so later calls may come from any thread.
    pub fn new(
        config: OrchestratorConfig,
        strategies: StrategyRegistry,
        memory_probe: Arc<dyn MemoryProbe>,
    ) -> Result<Self> {
        if strategies.is_empty() {
            bail!("at least one backgrounding strategy must be registered");
        }
        if config.max_concurrent_operations == 0 {
            bail!("max_concurrent_operations must be at least 1");
        }
        if config.backgrounding_timeout_ms == 0 {
            bail!("backgrounding_timeout_ms must be positive");
        }
        if config.max_results_to_retain == 0 {
            bail!("max_results_to_retain must be at least 1");
        }
        let runtime = Handle::try_current()
            .context("BackgroundingOrchestrator must be created inside a tokio runtime")?;

        info!(
            max_concurrent_operations = config.max_concurrent_operations,
            backgrounding_timeout_ms = config.backgrounding_timeout_ms,
            memory_pressure_threshold_mb = config.memory_pressure_threshold_mb,
            strategies = ?strategies.names(),
            "backgrounding orchestrator created"
        );

        let inner = OrchestratorInner {
            state: Mutex::new(SharedState {
                active: HashMap::new(),
                history: ResultHistory::new(config.max_results_to_retain),
                revision: 0,
            }),
            presentation: PresentationQueue::start(&runtime),
            in_progress: Published::new(false),
            last_result: Published::new(None),
            metrics: Published::new(MetricsSnapshot::empty(Utc::now())),
            config,
            strategies,
            memory_probe,
            runtime,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Register the delegate that receives attempt callbacks.
    pub fn set_delegate(&self, delegate: Arc<dyn BackgroundingDelegate>) {
        self.inner.presentation.set_delegate(Some(delegate));
    }

    pub fn clear_delegate(&self) {
        self.inner.presentation.set_delegate(None);
    }

    /// Request backgrounding for `call_id`. Returns immediately.
    ///
    /// `true` means the request was admitted and an attempt is under way; the
    /// outcome arrives through the delegate. `false` means admission refused it
    /// (see `try_initiate_backgrounding` for the reason).
    pub fn initiate_backgrounding(
        &self,
        call_id: impl Into<CallId>,
        preferred_strategy: Option<&str>,
    ) -> bool {
        let mut request = BackgroundingRequest::new(call_id);
        request.preferred_strategy = preferred_strategy.map(str::to_string);
        self.try_initiate_backgrounding(request).is_ok()
    }

    /// Like `initiate_backgrounding`, returning the selected strategy name or
    /// the admission error.
    pub fn try_initiate_backgrounding(
        &self,
        request: BackgroundingRequest,
    ) -> BackgroundingResult<String> {
        let BackgroundingRequest {
            call_id,
            preferred_strategy,
        } = request;

        match self.admit(&call_id, preferred_strategy.as_deref()) {
            Ok(admission) => {
                let strategy_name = admission.selection.strategy.name().to_string();
                self.spawn_attempt(call_id, admission);
                Ok(strategy_name)
            }
            Err(error) => {
                self.inner.reject(call_id, &error);
                Err(error)
            }
        }
    }

    /// Drop bookkeeping for `call_id`, e.g. because the call ended. Idempotent.
    ///
    /// The strategy may still land its effect; its late outcome is discarded
    /// and the operation is recorded as abandoned.
    pub fn cancel_backgrounding(&self, call_id: &CallId) {
        let abandoned = self
            .inner
            .abandon_matching("cancelled", |id, _| id == call_id);
        if abandoned == 0 {
            debug!(call_id = %call_id, "cancel for call with no active operation");
        }
    }

    /// Whether `call_id` currently has an attempt in flight.
    pub fn get_backgrounding_status(&self, call_id: &CallId) -> bool {
        self.inner.lock_state().active.contains_key(call_id)
    }

    pub fn is_backgrounding_in_progress(&self) -> bool {
        !self.inner.lock_state().active.is_empty()
    }

    pub fn active_operation_count(&self) -> usize {
        self.inner.lock_state().active.len()
    }

    /// Void every active operation. Called when the app enters the background.
    pub fn abandon_all_operations(&self) -> usize {
        self.inner
            .abandon_matching("app entered background", |_, _| true)
    }

    /// Drop operations whose race should have resolved more than `grace` ago.
    pub fn revalidate_operations(&self, grace: Duration) -> usize {
        let deadline = self.inner.config.backgrounding_timeout() + grace;
        let stale = self
            .inner
            .abandon_matching("stale on revalidation", |_, op| op.started_at.elapsed() > deadline);
        debug!(
            active = self.active_operation_count(),
            stale, "active operations revalidated"
        );
        stale
    }

    /// Trim history to half its cap and recompute metrics.
    pub fn trim_history_for_memory_warning(&self) -> usize {
        let (removed, revision, history) = {
            let mut state = self.inner.lock_state();
            let target = state.history.capacity() / 2;
            let removed = state.history.trim_to(target);
            let revision = state.bump();
            (removed, revision, state.history.to_vec())
        };
        info!(removed, retained = history.len(), "history trimmed after memory warning");
        self.inner.publish_metrics(revision, &history);
        removed
    }

    /// Prune history past the retention horizon and recompute metrics.
    pub fn sweep_history(&self) -> usize {
        let cutoff = Utc::now() - self.inner.config.retention_horizon();
        let (removed, revision, history) = {
            let mut state = self.inner.lock_state();
            let removed = state.history.prune_older_than(cutoff);
            let revision = state.bump();
            (removed, revision, state.history.to_vec())
        };
        debug!(removed, retained = history.len(), "history swept");
        self.inner.publish_metrics(revision, &history);
        removed
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.inner.metrics.tx.borrow().clone()
    }

    pub fn last_result(&self) -> Option<LastResult> {
        self.inner.last_result.tx.borrow().clone()
    }

    /// Retained attempt history, oldest first.
    pub fn recent_results(&self) -> Vec<AttemptResult> {
        self.inner.lock_state().history.to_vec()
    }

    pub fn subscribe_in_progress(&self) -> watch::Receiver<bool> {
        self.inner.in_progress.subscribe()
    }

    pub fn subscribe_last_result(&self) -> watch::Receiver<Option<LastResult>> {
        self.inner.last_result.subscribe()
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<MetricsSnapshot> {
        self.inner.metrics.subscribe()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.inner.strategies.names()
    }

    fn admit(
        &self,
        call_id: &CallId,
        preferred_strategy: Option<&str>,
    ) -> BackgroundingResult<Admission> {
        self.inner.check_memory_pressure()?;

        let rates = self
            .inner
            .metrics
            .tx
            .borrow()
            .success_rate_by_strategy
            .clone();
        let selection = select_strategy(&self.inner.strategies, preferred_strategy, &rates)
            .ok_or_else(|| {
                BackgroundingError::SystemBackgroundingBlocked(
                    "no backgrounding strategies registered".to_string(),
                )
            })?;

        let operation_id = Uuid::new_v4();
        let started_at = Instant::now();
        let revision = {
            let mut state = self.inner.lock_state();
            if state.active.contains_key(call_id) {
                return Err(BackgroundingError::ConcurrentBackgroundingAttempt {
                    call_id: call_id.clone(),
                    reason: ConcurrencyRejection::AlreadyActive,
                });
            }
            let limit = self.inner.config.max_concurrent_operations;
            if state.active.len() >= limit {
                return Err(BackgroundingError::ConcurrentBackgroundingAttempt {
                    call_id: call_id.clone(),
                    reason: ConcurrencyRejection::CeilingReached { limit },
                });
            }
            state.active.insert(
                call_id.clone(),
                ActiveOperation {
                    operation_id,
                    strategy_name: selection.strategy.name().to_string(),
                    started_at,
                },
            );
            state.bump()
        };
        self.inner.in_progress.publish(revision, true);

        Ok(Admission {
            operation_id,
            started_at,
            selection,
        })
    }

    fn spawn_attempt(&self, call_id: CallId, admission: Admission) {
        let Admission {
            operation_id,
            started_at,
            selection,
        } = admission;
        let strategy = selection.strategy;
        let strategy_name = strategy.name().to_string();

        info!(
            call_id = %call_id,
            strategy = %strategy_name,
            reason = ?selection.reason,
            "attempting backgrounding"
        );
        self.inner
            .presentation
            .will_attempt(call_id.clone(), strategy_name.clone());

        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(async move {
            let outcome = inner.race_strategy(&call_id, strategy).await;
            inner.complete(call_id, operation_id, strategy_name, outcome, started_at.elapsed());
        });
    }
}

impl OrchestratorInner {
    fn lock_state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_memory_pressure(&self) -> BackgroundingResult<()> {
        let threshold_mb = self.config.memory_pressure_threshold_mb;
        match self.memory_probe.resident_memory_mb() {
            Ok(resident_mb) if resident_mb > threshold_mb => {
                Err(BackgroundingError::MemoryPressureDetected {
                    resident_mb,
                    threshold_mb,
                })
            }
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(error = %err, "memory probe failed, admitting without memory gate");
                Ok(())
            }
        }
    }

    /// Run the strategy and race it against the backgrounding timeout.
    async fn race_strategy(
        &self,
        call_id: &CallId,
        strategy: Arc<dyn BackgroundingStrategy>,
    ) -> BackgroundingResult<()> {
        let (completion_tx, completion_rx) = oneshot::channel();
        let task_call_id = call_id.clone();
        let strategy_task = self.runtime.spawn(async move {
            let outcome = strategy.execute(&task_call_id).await;
            // Fails only when the timeout already won; the outcome is dropped.
            let _ = completion_tx.send(outcome);
        });

        match tokio::time::timeout(self.config.backgrounding_timeout(), completion_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(BackgroundingError::SystemBackgroundingBlocked(
                "strategy task ended without reporting an outcome".to_string(),
            )),
            Err(_) => {
                strategy_task.abort();
                Err(BackgroundingError::BackgroundTransitionTimeout {
                    timeout_ms: self.config.backgrounding_timeout_ms,
                })
            }
        }
    }

    fn complete(
        &self,
        call_id: CallId,
        operation_id: Uuid,
        strategy_name: String,
        outcome: BackgroundingResult<()>,
        elapsed: Duration,
    ) {
        let result = AttemptResult::from_outcome(call_id.clone(), strategy_name, &outcome, elapsed);

        let (revision, in_progress, history) = {
            let mut state = self.lock_state();
            let current = state
                .active
                .get(&call_id)
                .is_some_and(|op| op.operation_id == operation_id);
            if !current {
                debug!(
                    call_id = %call_id,
                    %operation_id,
                    "operation no longer active, discarding outcome"
                );
                return;
            }
            state.active.remove(&call_id);
            state.history.push(result.clone());
            let revision = state.bump();
            (revision, !state.active.is_empty(), state.history.to_vec())
        };

        match &outcome {
            Ok(()) => info!(
                call_id = %call_id,
                strategy = %result.strategy_name,
                duration_ms = result.duration_ms,
                "backgrounding succeeded"
            ),
            Err(err) => warn!(
                call_id = %call_id,
                strategy = %result.strategy_name,
                duration_ms = result.duration_ms,
                error_kind = %err.kind(),
                error = %err,
                "backgrounding failed"
            ),
        }

        self.in_progress.publish(revision, in_progress);
        self.last_result
            .publish(revision, Some(LastResult::Attempt(result)));
        self.publish_metrics(revision, &history);

        match outcome {
            Ok(()) => self.presentation.did_succeed(call_id),
            Err(error) => self.presentation.did_fail(call_id, error),
        }
    }

    fn reject(&self, call_id: CallId, error: &BackgroundingError) {
        warn!(
            call_id = %call_id,
            error_kind = %error.kind(),
            reason = %error,
            "backgrounding request rejected"
        );
        let revision = self.lock_state().bump();
        self.last_result.publish(
            revision,
            Some(LastResult::Rejected(AdmissionRejection::new(call_id, error))),
        );
    }

    /// Remove matching active operations, recording each as abandoned.
    fn abandon_matching<F>(&self, reason: &'static str, mut matches: F) -> usize
    where
        F: FnMut(&CallId, &ActiveOperation) -> bool,
    {
        let (abandoned, revision, in_progress, history) = {
            let mut state = self.lock_state();
            let doomed: Vec<CallId> = state
                .active
                .iter()
                .filter(|(id, op)| matches(id, op))
                .map(|(id, _)| id.clone())
                .collect();
            if doomed.is_empty() {
                return 0;
            }

            let mut abandoned = Vec::with_capacity(doomed.len());
            for call_id in doomed {
                if let Some(op) = state.active.remove(&call_id) {
                    let result =
                        AttemptResult::abandoned(call_id, op.strategy_name, op.started_at.elapsed());
                    state.history.push(result.clone());
                    abandoned.push(result);
                }
            }
            let revision = state.bump();
            (abandoned, revision, !state.active.is_empty(), state.history.to_vec())
        };

        for result in &abandoned {
            info!(
                call_id = %result.call_id,
                strategy = %result.strategy_name,
                reason,
                "backgrounding operation abandoned"
            );
        }

        self.in_progress.publish(revision, in_progress);
        self.publish_metrics(revision, &history);
        abandoned.len()
    }

    fn publish_metrics(&self, revision: u64, history: &[AttemptResult]) {
        let snapshot = MetricsAggregator::compute(history, Utc::now());
        self.metrics.publish(revision, snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::BackgroundingErrorKind;
    use crate::domain::ports::FixedMemoryProbe;
    use async_trait::async_trait;

    /// Strategy that never finishes on its own.
    struct Blocking;

    #[async_trait]
    impl BackgroundingStrategy for Blocking {
        fn name(&self) -> &str {
            "blocking"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn execute(&self, _call_id: &CallId) -> BackgroundingResult<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    /// Strategy that never finishes and flags when its future is dropped.
    struct DropFlagged {
        dropped: Arc<std::sync::atomic::AtomicBool>,
    }

    struct SetOnDrop(Arc<std::sync::atomic::AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl BackgroundingStrategy for DropFlagged {
        fn name(&self) -> &str {
            "drop_flagged"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn execute(&self, _call_id: &CallId) -> BackgroundingResult<()> {
            let _guard = SetOnDrop(Arc::clone(&self.dropped));
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn orchestrator(resident_mb: u64) -> BackgroundingOrchestrator {
        BackgroundingOrchestrator::new(
            OrchestratorConfig::default(),
            StrategyRegistry::new().register(Arc::new(Blocking)),
            Arc::new(FixedMemoryProbe::new(resident_mb)),
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_runtime() {
        let result = BackgroundingOrchestrator::new(
            OrchestratorConfig::default(),
            StrategyRegistry::new().register(Arc::new(Blocking)),
            Arc::new(FixedMemoryProbe::new(10)),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_new_requires_strategies() {
        let result = BackgroundingOrchestrator::new(
            OrchestratorConfig::default(),
            StrategyRegistry::new(),
            Arc::new(FixedMemoryProbe::new(10)),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_new_rejects_zero_limits() {
        for config in [
            OrchestratorConfig {
                max_concurrent_operations: 0,
                ..Default::default()
            },
            OrchestratorConfig {
                backgrounding_timeout_ms: 0,
                ..Default::default()
            },
            OrchestratorConfig {
                max_results_to_retain: 0,
                ..Default::default()
            },
        ] {
            let result = BackgroundingOrchestrator::new(
                config,
                StrategyRegistry::new().register(Arc::new(Blocking)),
                Arc::new(FixedMemoryProbe::new(10)),
            );
            assert!(result.is_err());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_strategy_task_is_aborted() {
        let dropped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let orchestrator = BackgroundingOrchestrator::new(
            OrchestratorConfig::default(),
            StrategyRegistry::new().register(Arc::new(DropFlagged {
                dropped: Arc::clone(&dropped),
            })),
            Arc::new(FixedMemoryProbe::new(10)),
        )
        .unwrap();
        let mut last_result = orchestrator.subscribe_last_result();

        assert!(orchestrator.initiate_backgrounding("call-1", None));
        last_result.changed().await.unwrap();
        assert_eq!(
            last_result.borrow().as_ref().and_then(LastResult::error_kind),
            Some(BackgroundingErrorKind::BackgroundTransitionTimeout)
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_duplicate_call_rejected() {
        let orchestrator = orchestrator(10);
        let call = CallId::from("call-1");

        assert!(orchestrator.initiate_backgrounding(call.clone(), None));
        let err = orchestrator
            .try_initiate_backgrounding(BackgroundingRequest::new(call.clone()))
            .unwrap_err();

        assert_eq!(
            err,
            BackgroundingError::ConcurrentBackgroundingAttempt {
                call_id: call.clone(),
                reason: ConcurrencyRejection::AlreadyActive,
            }
        );
        assert!(orchestrator.get_backgrounding_status(&call));
        assert_eq!(orchestrator.active_operation_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_gate_rejects_before_insert() {
        let orchestrator = orchestrator(250);

        let err = orchestrator
            .try_initiate_backgrounding(BackgroundingRequest::new("call-3"))
            .unwrap_err();

        assert_eq!(err.kind(), BackgroundingErrorKind::MemoryPressureDetected);
        assert_eq!(orchestrator.active_operation_count(), 0);
        assert!(!orchestrator.is_backgrounding_in_progress());
        assert_eq!(
            orchestrator.last_result().and_then(|r| r.error_kind()),
            Some(BackgroundingErrorKind::MemoryPressureDetected)
        );
        assert!(orchestrator.recent_results().is_empty());
    }

    #[tokio::test]
    async fn test_memory_exactly_at_threshold_is_admitted() {
        let orchestrator = orchestrator(200);
        assert!(orchestrator.initiate_backgrounding("call-1", None));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_records_abandoned() {
        let orchestrator = orchestrator(10);
        let call = CallId::from("call-1");
        let mut in_progress = orchestrator.subscribe_in_progress();

        assert!(orchestrator.initiate_backgrounding(call.clone(), None));
        assert!(*in_progress.borrow_and_update());

        orchestrator.cancel_backgrounding(&call);
        orchestrator.cancel_backgrounding(&call);

        assert!(!orchestrator.get_backgrounding_status(&call));
        assert!(!*in_progress.borrow_and_update());
        let history = orchestrator.recent_results();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_abandoned());
        assert_eq!(
            orchestrator
                .metrics_snapshot()
                .error_count(BackgroundingErrorKind::Abandoned),
            1
        );
        assert!(orchestrator.metrics_snapshot().success_rate("blocking").is_none());
    }

    #[tokio::test]
    async fn test_abandon_all_clears_active_set() {
        let orchestrator = orchestrator(10);
        for call in ["a", "b", "c"] {
            assert!(orchestrator.initiate_backgrounding(call, None));
        }

        assert_eq!(orchestrator.abandon_all_operations(), 3);
        assert_eq!(orchestrator.active_operation_count(), 0);
        assert_eq!(orchestrator.abandon_all_operations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revalidate_drops_only_stale_operations() {
        let orchestrator = orchestrator(10);
        assert!(orchestrator.initiate_backgrounding("call-1", None));

        assert_eq!(orchestrator.revalidate_operations(Duration::from_secs(1)), 0);
        assert_eq!(orchestrator.active_operation_count(), 1);

        // Attempt tasks have not been polled yet, so age the entry by hand.
        for op in orchestrator.inner.lock_state().active.values_mut() {
            op.started_at -= Duration::from_secs(10);
        }
        let stale = orchestrator.revalidate_operations(Duration::from_secs(1));
        assert_eq!(stale, 1);
        assert_eq!(orchestrator.active_operation_count(), 0);
    }
}
