//! Property-based tests for the result history and metrics aggregation.

use chrono::Utc;
use proptest::prelude::*;
use std::time::Duration;

use call_handoff::domain::errors::{BackgroundingError, BackgroundingErrorKind};
use call_handoff::domain::models::{AttemptResult, CallId};
use call_handoff::services::{MetricsAggregator, ResultHistory};

const STRATEGIES: [&str; 4] = [
    "window_minimization",
    "scene_backgrounding",
    "native_ui_provider_nudge",
    "system_background_task_extension",
];

#[derive(Debug, Clone)]
enum Outcome {
    Success,
    Failure,
    Timeout,
    Abandoned,
}

fn outcome_strategy() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        3 => Just(Outcome::Success),
        2 => Just(Outcome::Failure),
        1 => Just(Outcome::Timeout),
        1 => Just(Outcome::Abandoned),
    ]
}

fn attempt_strategy() -> impl Strategy<Value = AttemptResult> {
    (0..STRATEGIES.len(), outcome_strategy(), 0u64..5000, 0u32..1000).prop_map(
        |(strategy, outcome, millis, call)| {
            let call_id = CallId::new(format!("call-{call}"));
            let name = STRATEGIES[strategy];
            let elapsed = Duration::from_millis(millis);
            match outcome {
                Outcome::Success => AttemptResult::from_outcome(call_id, name, &Ok(()), elapsed),
                Outcome::Failure => AttemptResult::from_outcome(
                    call_id,
                    name,
                    &Err(BackgroundingError::WindowInteractionFailed("refused".to_string())),
                    elapsed,
                ),
                Outcome::Timeout => AttemptResult::from_outcome(
                    call_id,
                    name,
                    &Err(BackgroundingError::BackgroundTransitionTimeout { timeout_ms: 2000 }),
                    elapsed,
                ),
                Outcome::Abandoned => AttemptResult::abandoned(call_id, name, elapsed),
            }
        },
    )
}

proptest! {
    #[test]
    fn history_never_exceeds_capacity(
        capacity in 1usize..50,
        results in prop::collection::vec(attempt_strategy(), 0..200),
    ) {
        let mut history = ResultHistory::new(capacity);
        for result in &results {
            history.push(result.clone());
            prop_assert!(history.len() <= capacity);
        }

        // Survivors are the newest entries, in order.
        let kept = history.to_vec();
        let expected_start = results.len().saturating_sub(capacity);
        prop_assert_eq!(kept.as_slice(), &results[expected_start..]);
    }

    #[test]
    fn metrics_are_idempotent_and_bounded(
        results in prop::collection::vec(attempt_strategy(), 0..150),
    ) {
        let now = Utc::now();
        let first = MetricsAggregator::compute(&results, now);
        let second = MetricsAggregator::compute(&results, now);
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(first.total_attempts, results.len());
        prop_assert!(first.successful_attempts <= first.total_attempts);
        for rate in first.success_rate_by_strategy.values() {
            prop_assert!((0.0..=1.0).contains(rate));
        }

        let failures: usize = first.error_counts.values().sum();
        prop_assert_eq!(failures + first.successful_attempts, first.total_attempts);

        let abandoned = results.iter().filter(|r| r.is_abandoned()).count();
        prop_assert_eq!(first.error_count(BackgroundingErrorKind::Abandoned), abandoned);
    }

    #[test]
    fn trim_keeps_newest_half(
        results in prop::collection::vec(attempt_strategy(), 0..100),
    ) {
        let mut history = ResultHistory::new(100);
        for result in &results {
            history.push(result.clone());
        }

        let removed = history.trim_to(50);
        prop_assert_eq!(removed, results.len().saturating_sub(50));
        prop_assert!(history.len() <= 50);
        prop_assert_eq!(
            history.iter().last(),
            results.last()
        );
    }
}
