use async_trait::async_trait;

use crate::domain::errors::BackgroundingResult;
use crate::domain::models::CallId;

/// One way of moving the app out of the foreground so the native telephony UI
/// can take over.
///
/// Implementations are stateless apart from querying live host state. The
/// orchestrator runs `execute` on its own task and races it against the
/// backgrounding timeout, so a late completion is harmless: it is discarded.
/// Each implementation still bounds its own host calls.
///
/// # Examples
///
/// ```no_run
/// use call_handoff::domain::models::CallId;
/// use call_handoff::domain::ports::BackgroundingStrategy;
///
/// async fn example(strategy: &dyn BackgroundingStrategy) {
///     if strategy.is_available() {
///         let outcome = strategy.execute(&CallId::from("call-1")).await;
///         println!("{} -> {:?}", strategy.name(), outcome);
///     }
/// }
/// ```
#[async_trait]
pub trait BackgroundingStrategy: Send + Sync {
    /// Stable name, used as the metrics key and for preferred-strategy hints.
    fn name(&self) -> &str;

    /// Whether the strategy can run given the host's current state.
    fn is_available(&self) -> bool;

    /// Attempt to background the app for `call_id`.
    async fn execute(&self, call_id: &CallId) -> BackgroundingResult<()>;
}
