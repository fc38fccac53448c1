//! Domain errors for call presentation backgrounding.
//!
//! Every failure is a value. Attempts always resolve to a terminal result and
//! nothing here is fatal to the process; the Call UI Controller decides what the
//! user sees (conventionally an in-app call interface).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::models::CallId;

/// Classification of a failed or abandoned backgrounding attempt.
///
/// Used as the key of `MetricsSnapshot::error_counts` and stored on every
/// recorded `AttemptResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundingErrorKind {
    /// Host window API refused the transition.
    WindowInteractionFailed,
    /// No eligible foreground scene found.
    SceneStateInvalid,
    /// Neither success nor failure arrived within the deadline.
    BackgroundTransitionTimeout,
    /// Native UI bridge capability missing.
    NativeUiProviderUnavailable,
    /// Generic host refusal.
    SystemBackgroundingBlocked,
    /// Admission-time rejection: process memory above threshold.
    MemoryPressureDetected,
    /// Admission-time rejection: duplicate call or concurrency ceiling reached.
    ConcurrentBackgroundingAttempt,
    /// Operation was cancelled or voided by a lifecycle transition before it
    /// resolved. Bookkeeping only; never delivered to the delegate and never
    /// scored against a strategy.
    Abandoned,
}

impl BackgroundingErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WindowInteractionFailed => "window_interaction_failed",
            Self::SceneStateInvalid => "scene_state_invalid",
            Self::BackgroundTransitionTimeout => "background_transition_timeout",
            Self::NativeUiProviderUnavailable => "native_ui_provider_unavailable",
            Self::SystemBackgroundingBlocked => "system_backgrounding_blocked",
            Self::MemoryPressureDetected => "memory_pressure_detected",
            Self::ConcurrentBackgroundingAttempt => "concurrent_backgrounding_attempt",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether the kind is produced by admission rather than by running a strategy.
    pub fn is_admission_rejection(&self) -> bool {
        matches!(
            self,
            Self::MemoryPressureDetected | Self::ConcurrentBackgroundingAttempt
        )
    }
}

impl fmt::Display for BackgroundingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request was turned away as a concurrent attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyRejection {
    /// The call already has an operation in flight.
    AlreadyActive,
    /// The active set is at its ceiling.
    CeilingReached { limit: usize },
}

impl fmt::Display for ConcurrencyRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => f.write_str("an attempt is already in flight for this call"),
            Self::CeilingReached { limit } => {
                write!(f, "{limit} concurrent operations already in flight")
            }
        }
    }
}

/// Failure surfaced to the delegate or returned from admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackgroundingError {
    #[error("Window interaction failed: {0}")]
    WindowInteractionFailed(String),

    #[error("No eligible foreground scene: {0}")]
    SceneStateInvalid(String),

    #[error("Background transition timed out after {timeout_ms} ms")]
    BackgroundTransitionTimeout { timeout_ms: u64 },

    #[error("Native UI provider unavailable: {0}")]
    NativeUiProviderUnavailable(String),

    #[error("System blocked backgrounding: {0}")]
    SystemBackgroundingBlocked(String),

    #[error("Memory pressure detected: {resident_mb} MB resident exceeds {threshold_mb} MB")]
    MemoryPressureDetected { resident_mb: u64, threshold_mb: u64 },

    #[error("Concurrent backgrounding attempt rejected for call {call_id}: {reason}")]
    ConcurrentBackgroundingAttempt {
        call_id: CallId,
        reason: ConcurrencyRejection,
    },
}

impl BackgroundingError {
    pub fn kind(&self) -> BackgroundingErrorKind {
        match self {
            Self::WindowInteractionFailed(_) => BackgroundingErrorKind::WindowInteractionFailed,
            Self::SceneStateInvalid(_) => BackgroundingErrorKind::SceneStateInvalid,
            Self::BackgroundTransitionTimeout { .. } => {
                BackgroundingErrorKind::BackgroundTransitionTimeout
            }
            Self::NativeUiProviderUnavailable(_) => {
                BackgroundingErrorKind::NativeUiProviderUnavailable
            }
            Self::SystemBackgroundingBlocked(_) => BackgroundingErrorKind::SystemBackgroundingBlocked,
            Self::MemoryPressureDetected { .. } => BackgroundingErrorKind::MemoryPressureDetected,
            Self::ConcurrentBackgroundingAttempt { .. } => {
                BackgroundingErrorKind::ConcurrentBackgroundingAttempt
            }
        }
    }
}

/// Errors reported by host platform primitives.
///
/// Strategies translate these into the `BackgroundingError` taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Host refused the request: {0}")]
    Refused(String),

    #[error("No foreground scene is eligible for backgrounding")]
    NoForegroundScene,

    #[error("Native UI bridge is not installed")]
    BridgeMissing,

    #[error("Background task grant {0} already expired")]
    GrantExpired(u64),

    #[error("Host did not respond within {0} ms")]
    Unresponsive(u64),
}

pub type BackgroundingResult<T> = Result<T, BackgroundingError>;
