//! Hold a short background execution grant.
//!
//! While the grant is held the host is more willing to treat the app as
//! backgrounded. The grant is released after the hold window; if the host
//! revokes it first the attempt fails.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use super::bounded;
use crate::domain::errors::{BackgroundingError, BackgroundingResult};
use crate::domain::models::CallId;
use crate::domain::ports::{BackgroundingStrategy, HostPlatform};

const TASK_NAME: &str = "call-handoff.background-transition";

pub struct SystemBackgroundTaskExtensionStrategy {
    host: Arc<dyn HostPlatform>,
    sub_timeout: Duration,
    hold: Duration,
}

impl SystemBackgroundTaskExtensionStrategy {
    pub const NAME: &'static str = "system_background_task_extension";

    pub fn new(host: Arc<dyn HostPlatform>, sub_timeout: Duration, hold: Duration) -> Self {
        Self {
            host,
            sub_timeout,
            hold,
        }
    }
}

impl SystemBackgroundTaskExtensionStrategy {
    /// Acquire, hold and release one grant. `acquired` records the grant id
    /// so it can be released if the deadline cuts the sequence short.
    async fn hold_grant(
        &self,
        call_id: &CallId,
        acquired: &Mutex<Option<u64>>,
    ) -> BackgroundingResult<()> {
        let grant = self
            .host
            .begin_background_task(TASK_NAME)
            .await
            .map_err(|err| BackgroundingError::SystemBackgroundingBlocked(err.to_string()))?;
        *acquired.lock().unwrap_or_else(PoisonError::into_inner) = Some(grant.id);

        debug!(
            call_id = %call_id,
            grant_id = grant.id,
            expires_in_ms = u64::try_from(grant.expires_in.as_millis()).unwrap_or(u64::MAX),
            "background task grant acquired"
        );

        if grant.expires_in <= self.hold {
            tokio::time::sleep(grant.expires_in).await;
            // Release anyway; the host ignores or rejects a revoked id.
            if let Err(err) = self.host.end_background_task(grant.id).await {
                debug!(grant_id = grant.id, error = %err, "release after expiry");
            }
            acquired.lock().unwrap_or_else(PoisonError::into_inner).take();
            warn!(call_id = %call_id, grant_id = grant.id, "background task grant expired before release");
            return Err(BackgroundingError::SystemBackgroundingBlocked(format!(
                "background task grant {} expired before release",
                grant.id
            )));
        }

        tokio::time::sleep(self.hold).await;
        let released = self
            .host
            .end_background_task(grant.id)
            .await
            .map_err(|err| BackgroundingError::SystemBackgroundingBlocked(err.to_string()));
        acquired.lock().unwrap_or_else(PoisonError::into_inner).take();
        released
    }

    /// Release a grant left behind by a cut-short attempt without waiting on it.
    fn release_in_background(&self, grant_id: u64) {
        let host = Arc::clone(&self.host);
        let limit = self.sub_timeout;
        tokio::spawn(async move {
            if let Err(err) = bounded(limit, host.end_background_task(grant_id)).await {
                debug!(grant_id, error = %err, "late release of background task grant failed");
            }
        });
    }
}

#[async_trait]
impl BackgroundingStrategy for SystemBackgroundTaskExtensionStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        true
    }

    /// The whole acquire/hold/release sequence shares one sub-timeout.
    async fn execute(&self, call_id: &CallId) -> BackgroundingResult<()> {
        let acquired = Mutex::new(None);
        match bounded(self.sub_timeout, async {
            Ok(self.hold_grant(call_id, &acquired).await)
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                let pending = acquired.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(grant_id) = pending {
                    self.release_in_background(grant_id);
                }
                Err(BackgroundingError::SystemBackgroundingBlocked(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::host::{SimulatedHost, SimulatedHostConfig};
    use crate::domain::errors::BackgroundingErrorKind;
    use crate::domain::models::StrategyConfig;

    #[tokio::test(start_paused = true)]
    async fn test_holds_and_releases_grant() {
        let host = Arc::new(SimulatedHost::new());
        let strategy = SystemBackgroundTaskExtensionStrategy::new(
            host.clone(),
            Duration::from_secs(1),
            Duration::from_millis(500),
        );

        let started = tokio::time::Instant::now();
        strategy.execute(&CallId::from("call-1")).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(host.open_grants(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_grant_expiring_first_fails() {
        let host = Arc::new(SimulatedHost::with_config(SimulatedHostConfig {
            grant_expires_in: Duration::from_millis(100),
            ..Default::default()
        }));
        let strategy = SystemBackgroundTaskExtensionStrategy::new(
            host.clone(),
            Duration::from_secs(1),
            Duration::from_millis(500),
        );

        let err = strategy.execute(&CallId::from("call-1")).await.unwrap_err();
        assert_eq!(err.kind(), BackgroundingErrorKind::SystemBackgroundingBlocked);
        assert_eq!(host.open_grants(), 0);
    }

    #[tokio::test]
    async fn test_grant_refused() {
        let host = Arc::new(SimulatedHost::with_config(SimulatedHostConfig {
            background_tasks_refused: true,
            ..Default::default()
        }));
        let strategy = SystemBackgroundTaskExtensionStrategy::new(
            host,
            Duration::from_secs(1),
            Duration::from_millis(10),
        );

        let err = strategy.execute(&CallId::from("call-1")).await.unwrap_err();
        assert_eq!(err.kind(), BackgroundingErrorKind::SystemBackgroundingBlocked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_host_stays_within_sub_timeout() {
        let host = Arc::new(SimulatedHost::with_config(SimulatedHostConfig {
            latency: Duration::from_millis(1400),
            ..Default::default()
        }));
        let config = StrategyConfig::default();
        let strategy = SystemBackgroundTaskExtensionStrategy::new(
            host.clone(),
            config.sub_timeout(),
            config.background_task_hold(),
        );

        let started = tokio::time::Instant::now();
        let err = strategy.execute(&CallId::from("call-1")).await.unwrap_err();

        assert!(started.elapsed() <= config.sub_timeout());
        assert_eq!(err.kind(), BackgroundingErrorKind::SystemBackgroundingBlocked);

        // The grant acquired before the deadline is still released.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(host.open_grants(), 0);
    }
}
