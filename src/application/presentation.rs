//! Presentation context for delegate callbacks.
//!
//! A single task drains an ordered queue and invokes the delegate, so
//! callbacks never run on a backgrounding task or under the orchestrator lock.

use std::sync::{Arc, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::errors::BackgroundingError;
use crate::domain::models::CallId;
use crate::domain::ports::BackgroundingDelegate;

type DelegateSlot = Arc<RwLock<Option<Arc<dyn BackgroundingDelegate>>>>;

#[derive(Debug)]
enum PresentationEvent {
    WillAttempt { call_id: CallId, strategy: String },
    DidSucceed { call_id: CallId },
    DidFail {
        call_id: CallId,
        error: BackgroundingError,
    },
}

pub(crate) struct PresentationQueue {
    tx: mpsc::UnboundedSender<PresentationEvent>,
    delegate: DelegateSlot,
}

impl PresentationQueue {
    /// Spawn the presentation task. It exits once the queue is dropped.
    pub(crate) fn start(runtime: &Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PresentationEvent>();
        let delegate: DelegateSlot = Arc::new(RwLock::new(None));
        let slot = Arc::clone(&delegate);

        runtime.spawn(async move {
            while let Some(event) = rx.recv().await {
                let current = slot.read().unwrap_or_else(PoisonError::into_inner).clone();
                match current {
                    Some(delegate) => dispatch(delegate.as_ref(), event),
                    None => debug!(?event, "no delegate registered"),
                }
            }
            debug!("presentation queue closed");
        });

        Self { tx, delegate }
    }

    pub(crate) fn set_delegate(&self, delegate: Option<Arc<dyn BackgroundingDelegate>>) {
        *self.delegate.write().unwrap_or_else(PoisonError::into_inner) = delegate;
    }

    pub(crate) fn will_attempt(&self, call_id: CallId, strategy: String) {
        self.send(PresentationEvent::WillAttempt { call_id, strategy });
    }

    pub(crate) fn did_succeed(&self, call_id: CallId) {
        self.send(PresentationEvent::DidSucceed { call_id });
    }

    pub(crate) fn did_fail(&self, call_id: CallId, error: BackgroundingError) {
        self.send(PresentationEvent::DidFail { call_id, error });
    }

    fn send(&self, event: PresentationEvent) {
        if let Err(err) = self.tx.send(event) {
            debug!(event = ?err.0, "presentation task stopped; dropping event");
        }
    }
}

fn dispatch(delegate: &dyn BackgroundingDelegate, event: PresentationEvent) {
    match event {
        PresentationEvent::WillAttempt { call_id, strategy } => {
            delegate.backgrounding_will_attempt_strategy(&call_id, &strategy);
        }
        PresentationEvent::DidSucceed { call_id } => delegate.backgrounding_did_succeed(&call_id),
        PresentationEvent::DidFail { call_id, error } => {
            delegate.backgrounding_did_fail(&call_id, &error);
        }
    }
}
