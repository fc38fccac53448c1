//! Infrastructure layer module
//!
//! Configuration loading and logging setup. Host-facing adapters live under
//! `adapters`.

pub mod config;
pub mod logging;
