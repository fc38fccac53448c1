use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::errors::BackgroundingErrorKind;

/// Aggregate view over the retained attempt history.
///
/// Always derived from the history buffer; holds no independent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub average_duration_ms: f64,
    /// Success rate in `0.0..=1.0`, keyed by strategy name. Abandoned attempts
    /// are not scored.
    pub success_rate_by_strategy: BTreeMap<String, f64>,
    pub error_counts: BTreeMap<BackgroundingErrorKind, usize>,
    pub computed_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            total_attempts: 0,
            successful_attempts: 0,
            average_duration_ms: 0.0,
            success_rate_by_strategy: BTreeMap::new(),
            error_counts: BTreeMap::new(),
            computed_at,
        }
    }

    pub fn success_rate(&self, strategy: &str) -> Option<f64> {
        self.success_rate_by_strategy.get(strategy).copied()
    }

    pub fn error_count(&self, kind: BackgroundingErrorKind) -> usize {
        self.error_counts.get(&kind).copied().unwrap_or(0)
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self::empty(Utc::now())
    }
}
