//! Host platform state exchanged with strategies and observers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle phase of the application as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppLifecyclePhase {
    ForegroundActive,
    ForegroundInactive,
    Background,
}

/// Lifecycle notifications delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleSignal {
    DidEnterBackground,
    WillEnterForeground,
    MemoryWarning,
}

/// Visual state requested for the app's window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPresentation {
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
    pub user_interaction_enabled: bool,
}

impl WindowPresentation {
    /// Faded out with input suspended, leaving the telephony UI unobstructed.
    pub const fn minimized() -> Self {
        Self {
            alpha: 0.0,
            user_interaction_enabled: false,
        }
    }

    pub const fn restored() -> Self {
        Self {
            alpha: 1.0,
            user_interaction_enabled: true,
        }
    }
}

/// Short-lived background execution grant issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundTaskGrant {
    pub id: u64,
    /// Time until the host revokes the grant on its own.
    pub expires_in: Duration,
}
