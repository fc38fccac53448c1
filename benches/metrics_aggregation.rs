//! Benchmarks for the work done on every attempt completion and admission.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;

use call_handoff::adapters::host::SimulatedHost;
use call_handoff::adapters::strategies::default_registry;
use call_handoff::domain::errors::BackgroundingError;
use call_handoff::domain::models::{AttemptResult, CallId, StrategyConfig};
use call_handoff::services::{select_strategy, MetricsAggregator, ResultHistory};

const STRATEGIES: [&str; 4] = [
    "window_minimization",
    "scene_backgrounding",
    "native_ui_provider_nudge",
    "system_background_task_extension",
];

fn history(len: usize) -> ResultHistory {
    let mut history = ResultHistory::new(len);
    for i in 0..len {
        let outcome = if i % 3 == 0 {
            Err(BackgroundingError::WindowInteractionFailed("refused".to_string()))
        } else {
            Ok(())
        };
        history.push(AttemptResult::from_outcome(
            CallId::new(format!("call-{i}")),
            STRATEGIES[i % STRATEGIES.len()],
            &outcome,
            Duration::from_millis((i as u64 * 37) % 2000),
        ));
    }
    history
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics_compute");
    for len in [10usize, 100, 1000] {
        let history = history(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &history, |b, history| {
            b.iter(|| MetricsAggregator::compute(black_box(history.iter()), Utc::now()));
        });
    }
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let registry = default_registry(Arc::new(SimulatedHost::new()), &StrategyConfig::default());
    let rates = MetricsAggregator::compute(history(100).iter(), Utc::now()).success_rate_by_strategy;

    c.bench_function("select_strategy", |b| {
        b.iter(|| select_strategy(black_box(&registry), None, black_box(&rates)));
    });
}

criterion_group!(benches, bench_compute, bench_select);
criterion_main!(benches);
