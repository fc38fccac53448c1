//! Strategy selection.
//!
//! Policy, in order:
//! 1. The preferred strategy, if named, registered and available.
//! 2. The available strategy with the highest historical success rate.
//!    Strategies without history score `UNTRIED_STRATEGY_RATE` so they still
//!    get tried. Equal rates go to the earliest registered strategy.
//! 3. The registry's last resort (its first entry) when nothing is available.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::strategy_registry::StrategyRegistry;
use crate::domain::ports::BackgroundingStrategy;

/// Score given to strategies with no recorded attempts.
pub const UNTRIED_STRATEGY_RATE: f64 = 0.5;

/// Why a strategy was chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionReason {
    Preferred,
    HighestSuccessRate { rate: f64 },
    LastResort,
}

/// The outcome of selection.
#[derive(Clone)]
pub struct StrategySelection {
    pub strategy: Arc<dyn BackgroundingStrategy>,
    pub reason: SelectionReason,
}

impl std::fmt::Debug for StrategySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategySelection")
            .field("strategy", &self.strategy.name())
            .field("reason", &self.reason)
            .finish()
    }
}

/// Pick a strategy for one request. Returns `None` only for an empty registry.
pub fn select_strategy(
    registry: &StrategyRegistry,
    preferred: Option<&str>,
    success_rates: &BTreeMap<String, f64>,
) -> Option<StrategySelection> {
    if let Some(strategy) = preferred
        .and_then(|name| registry.get(name))
        .filter(|strategy| strategy.is_available())
    {
        return Some(StrategySelection {
            strategy: Arc::clone(strategy),
            reason: SelectionReason::Preferred,
        });
    }

    let mut best: Option<(&Arc<dyn BackgroundingStrategy>, f64)> = None;
    for strategy in registry.iter().filter(|s| s.is_available()) {
        let rate = success_rates
            .get(strategy.name())
            .copied()
            .unwrap_or(UNTRIED_STRATEGY_RATE);
        // Strictly greater: ties keep the earlier registration.
        if best.map_or(true, |(_, best_rate)| rate > best_rate) {
            best = Some((strategy, rate));
        }
    }

    if let Some((strategy, rate)) = best {
        return Some(StrategySelection {
            strategy: Arc::clone(strategy),
            reason: SelectionReason::HighestSuccessRate { rate },
        });
    }

    registry.last_resort().map(|strategy| StrategySelection {
        strategy: Arc::clone(strategy),
        reason: SelectionReason::LastResort,
    })
}
