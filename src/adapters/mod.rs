//! Adapters: concrete strategies and host platform implementations.

pub mod host;
pub mod strategies;
