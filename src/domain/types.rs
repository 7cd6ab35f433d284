//! Domain newtypes for the identifiers flowing through the trace pipeline.
//!
//! These wrappers prevent mixing up the three integer id spaces (process,
//! thread group, goroutine) and give diagnostics a consistent rendering.

use std::fmt;

/// Process ID of the thread that triggered the state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

/// Thread-group ID (the process id in userspace terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tgid(pub u32);

impl fmt::Display for Tgid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TGID:{}", self.0)
    }
}

/// Goroutine ID assigned by the Go runtime.
///
/// Stable for the goroutine's lifetime and distinct from any kernel id; the
/// kernel knows nothing about goroutines, the probe reads this out of the
/// runtime's `g` structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoroutineId(pub u64);

impl fmt::Display for GoroutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "goid:{}", self.0)
    }
}
