//! Service layer: history, metrics and strategy selection.

pub mod metrics_aggregator;
pub mod result_history;
pub mod strategy_registry;
pub mod strategy_selector;

pub use metrics_aggregator::MetricsAggregator;
pub use result_history::ResultHistory;
pub use strategy_registry::StrategyRegistry;
pub use strategy_selector::{
    select_strategy, SelectionReason, StrategySelection, UNTRIED_STRATEGY_RATE,
};
