//! Domain layer for call presentation backgrounding
//!
//! This module contains the core models, the error taxonomy and the port
//! traits that collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{BackgroundingError, BackgroundingErrorKind, HostError};
