use anyhow::Result;

/// Source of the process's resident memory, consulted at admission.
pub trait MemoryProbe: Send + Sync {
    /// Resident set size of the current process in megabytes.
    fn resident_memory_mb(&self) -> Result<u64>;
}

/// Probe that always reports the same value.
///
/// Useful for simulations and for exercising the memory-pressure gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMemoryProbe {
    resident_mb: u64,
}

impl FixedMemoryProbe {
    pub fn new(resident_mb: u64) -> Self {
        Self { resident_mb }
    }
}

impl MemoryProbe for FixedMemoryProbe {
    fn resident_memory_mb(&self) -> Result<u64> {
        Ok(self.resident_mb)
    }
}
