//! Registry of backgrounding strategies.

use std::sync::Arc;

use crate::domain::ports::BackgroundingStrategy;

/// Strategies in registration order.
///
/// The first registered strategy is the last resort used when nothing
/// reports itself available. It runs regardless of its own availability, so
/// a registry whose first entry can be unavailable should also hold an
/// always-available strategy; the default set does (the native UI nudge and
/// the background task extension), which keeps the last-resort branch
/// unreachable for it.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn BackgroundingStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy. Names are expected to be unique.
    pub fn register(mut self, strategy: Arc<dyn BackgroundingStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn BackgroundingStrategy>> {
        self.strategies.iter().find(|s| s.name() == name)
    }

    pub fn last_resort(&self) -> Option<&Arc<dyn BackgroundingStrategy>> {
        self.strategies.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn BackgroundingStrategy>> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}
