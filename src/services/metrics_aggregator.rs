//! Metrics aggregation over the attempt history.
//!
//! A pure function of the history: the same entries always produce the same
//! rates and counts. Cost is linear in the (bounded) history size.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::domain::models::{AttemptResult, MetricsSnapshot};

/// Computes `MetricsSnapshot`s from attempt results.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsAggregator;

#[derive(Default)]
struct StrategyTally {
    scored: usize,
    succeeded: usize,
}

impl MetricsAggregator {
    /// Aggregate `results`, stamping the snapshot with `computed_at`.
    ///
    /// Abandoned entries count toward `total_attempts` and `error_counts` but
    /// are left out of per-strategy success rates and the average duration.
    pub fn compute<'a, I>(results: I, computed_at: DateTime<Utc>) -> MetricsSnapshot
    where
        I: IntoIterator<Item = &'a AttemptResult>,
    {
        let mut total_attempts = 0usize;
        let mut successful_attempts = 0usize;
        let mut duration_total = 0u128;
        let mut timed = 0usize;
        let mut tallies: BTreeMap<&str, StrategyTally> = BTreeMap::new();
        let mut error_counts = BTreeMap::new();

        for result in results {
            total_attempts += 1;
            if let Some(kind) = result.error_kind {
                *error_counts.entry(kind).or_insert(0) += 1;
            }
            if result.is_abandoned() {
                continue;
            }

            duration_total += u128::from(result.duration_ms);
            timed += 1;

            let tally = tallies.entry(result.strategy_name.as_str()).or_default();
            tally.scored += 1;
            if result.success {
                tally.succeeded += 1;
                successful_attempts += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let average_duration_ms = if timed == 0 {
            0.0
        } else {
            duration_total as f64 / timed as f64
        };

        #[allow(clippy::cast_precision_loss)]
        let success_rate_by_strategy = tallies
            .into_iter()
            .map(|(name, tally)| {
                (
                    name.to_string(),
                    tally.succeeded as f64 / tally.scored as f64,
                )
            })
            .collect();

        MetricsSnapshot {
            total_attempts,
            successful_attempts,
            average_duration_ms,
            success_rate_by_strategy,
            error_counts,
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::BackgroundingErrorKind;
    use crate::domain::models::CallId;

    fn attempt(strategy: &str, success: bool, duration_ms: u64) -> AttemptResult {
        AttemptResult {
            call_id: CallId::from("call-1"),
            strategy_name: strategy.to_string(),
            success,
            duration_ms,
            timestamp: Utc::now(),
            error_kind: (!success).then_some(BackgroundingErrorKind::SystemBackgroundingBlocked),
        }
    }

    #[test]
    fn test_empty_history() {
        let now = Utc::now();
        let snapshot = MetricsAggregator::compute(std::iter::empty(), now);
        assert_eq!(snapshot, MetricsSnapshot::empty(now));
    }

    #[test]
    fn test_rates_and_counts() {
        let results = vec![
            attempt("a", true, 10),
            attempt("a", false, 30),
            attempt("b", true, 20),
        ];

        let snapshot = MetricsAggregator::compute(&results, Utc::now());

        assert_eq!(snapshot.total_attempts, 3);
        assert_eq!(snapshot.successful_attempts, 2);
        assert!((snapshot.average_duration_ms - 20.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.success_rate("a"), Some(0.5));
        assert_eq!(snapshot.success_rate("b"), Some(1.0));
        assert_eq!(
            snapshot.error_count(BackgroundingErrorKind::SystemBackgroundingBlocked),
            1
        );
    }

    #[test]
    fn test_abandoned_not_scored() {
        let results = vec![
            attempt("a", true, 10),
            AttemptResult::abandoned(
                CallId::from("call-2"),
                "a",
                std::time::Duration::from_millis(900),
            ),
        ];

        let snapshot = MetricsAggregator::compute(&results, Utc::now());

        assert_eq!(snapshot.total_attempts, 2);
        assert_eq!(snapshot.success_rate("a"), Some(1.0));
        assert!((snapshot.average_duration_ms - 10.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.error_count(BackgroundingErrorKind::Abandoned), 1);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let results = vec![attempt("a", true, 10), attempt("b", false, 40)];
        let now = Utc::now();

        let first = MetricsAggregator::compute(&results, now);
        let second = MetricsAggregator::compute(&results, now);

        assert_eq!(first.success_rate_by_strategy, second.success_rate_by_strategy);
        assert_eq!(first.error_counts, second.error_counts);
    }
}
