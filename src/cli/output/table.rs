//! Table output formatting using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};

use crate::domain::models::{AttemptResult, Config, MetricsSnapshot};

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(columns: &[&str]) -> Vec<Cell> {
    columns
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

/// Per-strategy success rates followed by error counts.
pub fn format_metrics_table(metrics: &MetricsSnapshot) -> String {
    let mut table = base_table();
    table.set_header(header(&["Metric", "Value"]));

    table.add_row(vec![
        Cell::new("Total attempts"),
        Cell::new(metrics.total_attempts),
    ]);
    table.add_row(vec![
        Cell::new("Successful attempts"),
        Cell::new(metrics.successful_attempts),
    ]);
    table.add_row(vec![
        Cell::new("Average duration"),
        Cell::new(format!("{:.1} ms", metrics.average_duration_ms)),
    ]);

    for (strategy, rate) in &metrics.success_rate_by_strategy {
        let color = if *rate >= 0.5 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(format!("Success rate: {strategy}")),
            Cell::new(format!("{:.0}%", rate * 100.0)).fg(color),
        ]);
    }

    for (kind, count) in &metrics.error_counts {
        table.add_row(vec![
            Cell::new(format!("Errors: {kind}")),
            Cell::new(count).fg(Color::Yellow),
        ]);
    }

    table.to_string()
}

pub fn format_attempts_table(results: &[AttemptResult]) -> String {
    let mut table = base_table();
    table.set_header(header(&["Call", "Strategy", "Outcome", "Duration", "At"]));

    for result in results {
        let outcome = match (result.success, result.error_kind) {
            (true, _) => Cell::new("succeeded").fg(Color::Green),
            (false, Some(kind)) => Cell::new(kind).fg(Color::Red),
            (false, None) => Cell::new("failed").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&result.call_id),
            Cell::new(&result.strategy_name),
            outcome,
            Cell::new(format!("{} ms", result.duration_ms)),
            Cell::new(result.timestamp.format("%H:%M:%S%.3f")),
        ]);
    }

    table.to_string()
}

pub fn format_config_table(config: &Config) -> String {
    let orchestrator = &config.orchestrator;
    let mut table = base_table();
    table.set_header(header(&["Setting", "Value"]));

    let rows: [(&str, String); 10] = [
        (
            "orchestrator.max_concurrent_operations",
            orchestrator.max_concurrent_operations.to_string(),
        ),
        (
            "orchestrator.backgrounding_timeout_ms",
            orchestrator.backgrounding_timeout_ms.to_string(),
        ),
        (
            "orchestrator.metrics_retention_days",
            orchestrator.metrics_retention_days.to_string(),
        ),
        (
            "orchestrator.max_results_to_retain",
            orchestrator.max_results_to_retain.to_string(),
        ),
        (
            "orchestrator.memory_pressure_threshold_mb",
            orchestrator.memory_pressure_threshold_mb.to_string(),
        ),
        (
            "orchestrator.metrics_sweep_interval_secs",
            orchestrator.metrics_sweep_interval_secs.to_string(),
        ),
        (
            "strategies.sub_timeout_ms",
            config.strategies.sub_timeout_ms.to_string(),
        ),
        (
            "strategies.background_task_hold_ms",
            config.strategies.background_task_hold_ms.to_string(),
        ),
        ("logging.level", config.logging.level.clone()),
        ("logging.format", config.logging.format.clone()),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::BackgroundingErrorKind;
    use crate::domain::models::CallId;
    use chrono::Utc;
    use std::time::Duration;

    #[test]
    fn test_metrics_table_lists_strategies_and_errors() {
        let mut metrics = MetricsSnapshot::empty(Utc::now());
        metrics.total_attempts = 2;
        metrics.successful_attempts = 1;
        metrics
            .success_rate_by_strategy
            .insert("window_minimization".to_string(), 0.5);
        metrics
            .error_counts
            .insert(BackgroundingErrorKind::WindowInteractionFailed, 1);

        let rendered = format_metrics_table(&metrics);
        assert!(rendered.contains("window_minimization"));
        assert!(rendered.contains("50%"));
        assert!(rendered.contains("window_interaction_failed"));
    }

    #[test]
    fn test_attempts_table_shows_abandoned() {
        let results = vec![AttemptResult::abandoned(
            CallId::from("call-9"),
            "scene_backgrounding",
            Duration::from_millis(12),
        )];

        let rendered = format_attempts_table(&results);
        assert!(rendered.contains("call-9"));
        assert!(rendered.contains("abandoned"));
        assert!(rendered.contains("12 ms"));
    }

    #[test]
    fn test_config_table_shows_defaults() {
        let rendered = format_config_table(&Config::default());
        assert!(rendered.contains("max_concurrent_operations"));
        assert!(rendered.contains("2000"));
    }
}
