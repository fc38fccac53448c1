pub mod lifecycle_observer;
pub mod orchestrator;
mod presentation;
pub mod resource_monitor;

pub use lifecycle_observer::{
    LifecycleObserver, LifecycleObserverConfig, ObserverHandle, ObserverStatus,
};
pub use orchestrator::BackgroundingOrchestrator;
pub use resource_monitor::{MemoryStatus, ProcessMemoryMonitor};
