//! Attempt results and admission rejections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CallId;
use crate::domain::errors::{BackgroundingError, BackgroundingErrorKind};

/// Immutable record of one resolved backgrounding attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub call_id: CallId,
    pub strategy_name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub error_kind: Option<BackgroundingErrorKind>,
}

impl AttemptResult {
    /// Build a result from a strategy outcome (or the timeout that beat it).
    pub fn from_outcome(
        call_id: CallId,
        strategy_name: impl Into<String>,
        outcome: &Result<(), BackgroundingError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            call_id,
            strategy_name: strategy_name.into(),
            success: outcome.is_ok(),
            duration_ms: duration_to_ms(elapsed),
            timestamp: Utc::now(),
            error_kind: outcome.as_ref().err().map(BackgroundingError::kind),
        }
    }

    /// Result for an operation voided before its race resolved.
    pub fn abandoned(call_id: CallId, strategy_name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            call_id,
            strategy_name: strategy_name.into(),
            success: false,
            duration_ms: duration_to_ms(elapsed),
            timestamp: Utc::now(),
            error_kind: Some(BackgroundingErrorKind::Abandoned),
        }
    }

    pub fn is_abandoned(&self) -> bool {
        self.error_kind == Some(BackgroundingErrorKind::Abandoned)
    }
}

/// A request turned away at admission. No strategy ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRejection {
    pub call_id: CallId,
    pub error_kind: BackgroundingErrorKind,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl AdmissionRejection {
    pub fn new(call_id: CallId, error: &BackgroundingError) -> Self {
        Self {
            call_id,
            error_kind: error.kind(),
            reason: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Latest outcome published to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LastResult {
    Attempt(AttemptResult),
    Rejected(AdmissionRejection),
}

impl LastResult {
    pub fn call_id(&self) -> &CallId {
        match self {
            Self::Attempt(result) => &result.call_id,
            Self::Rejected(rejection) => &rejection.call_id,
        }
    }

    pub fn error_kind(&self) -> Option<BackgroundingErrorKind> {
        match self {
            Self::Attempt(result) => result.error_kind,
            Self::Rejected(rejection) => Some(rejection.error_kind),
        }
    }
}

fn duration_to_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
