//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces collaborators implement:
//! - BackgroundingStrategy: one way of handing off to the native telephony UI
//! - HostPlatform: lifecycle, window, scene and background-task primitives
//! - BackgroundingDelegate: callbacks to the Call UI Controller
//! - MemoryProbe: process memory sampling for the admission gate

pub mod delegate;
pub mod host_platform;
pub mod memory_probe;
pub mod strategy;

pub use delegate::{BackgroundingDelegate, NullDelegate};
pub use host_platform::HostPlatform;
pub use memory_probe::{FixedMemoryProbe, MemoryProbe};
pub use strategy::BackgroundingStrategy;
