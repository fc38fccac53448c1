use crate::domain::errors::BackgroundingError;
use crate::domain::models::CallId;

/// Callbacks delivered to the Call UI Controller.
///
/// Invoked in order on the orchestrator's presentation task, never while the
/// orchestrator holds its lock. On `backgrounding_did_fail` the controller is
/// expected to fall back to its in-app call interface.
pub trait BackgroundingDelegate: Send + Sync {
    /// A request was admitted and `strategy` is about to run.
    fn backgrounding_will_attempt_strategy(&self, call_id: &CallId, strategy: &str);

    fn backgrounding_did_succeed(&self, call_id: &CallId);

    fn backgrounding_did_fail(&self, call_id: &CallId, error: &BackgroundingError);
}

/// Delegate that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDelegate;

impl BackgroundingDelegate for NullDelegate {
    fn backgrounding_will_attempt_strategy(&self, _call_id: &CallId, _strategy: &str) {}

    fn backgrounding_did_succeed(&self, _call_id: &CallId) {}

    fn backgrounding_did_fail(&self, _call_id: &CallId, _error: &BackgroundingError) {}
}
