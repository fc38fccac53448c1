use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use sysinfo::{Pid, System};
use tracing::debug;

use crate::domain::ports::MemoryProbe;

/// Memory usage of the current process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStatus {
    /// Resident set size in MB
    pub resident_mb: u64,

    /// Timestamp of the measurement
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Samples the current process's resident memory with sysinfo.
///
/// Backs the orchestrator's memory-pressure admission gate. Each check
/// refreshes only this process, so sampling stays cheap enough to run on
/// every admission.
///
/// # Examples
///
/// ```
/// use call_handoff::application::ProcessMemoryMonitor;
///
/// let monitor = ProcessMemoryMonitor::new();
/// let status = monitor.check_memory().unwrap();
/// assert!(status.resident_mb < 1_000_000);
/// ```
pub struct ProcessMemoryMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    current_status: Mutex<Option<MemoryStatus>>,
}

impl ProcessMemoryMonitor {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid().ok();
        Self {
            system: Mutex::new(System::new()),
            pid,
            current_status: Mutex::new(None),
        }
    }

    /// Refresh and return the process's memory usage.
    pub fn check_memory(&self) -> Result<MemoryStatus> {
        let pid = self
            .pid
            .ok_or_else(|| anyhow!("current process id is unavailable on this platform"))?;

        let resident_bytes = {
            let mut sys = self.system.lock().unwrap_or_else(PoisonError::into_inner);
            if !sys.refresh_process(pid) {
                return Err(anyhow!("process {pid} not found while sampling memory"));
            }
            sys.process(pid)
                .map(sysinfo::Process::memory)
                .ok_or_else(|| anyhow!("process {pid} vanished while sampling memory"))?
        };

        let status = MemoryStatus {
            resident_mb: resident_bytes / 1024 / 1024,
            timestamp: chrono::Utc::now(),
        };
        debug!(resident_mb = status.resident_mb, "process memory sampled");

        *self
            .current_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status.clone());

        Ok(status)
    }

    /// Most recent sample, or `None` before the first check.
    pub fn get_status(&self) -> Option<MemoryStatus> {
        self.current_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ProcessMemoryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemoryMonitor {
    fn resident_memory_mb(&self) -> Result<u64> {
        Ok(self.check_memory()?.resident_mb)
    }
}
