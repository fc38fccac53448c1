//! Host platform adapters.

pub mod simulated;

pub use simulated::{SimulatedHost, SimulatedHostConfig};
