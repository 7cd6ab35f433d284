//! Domain model for goscope
//!
//! Core identifier newtypes and structured errors shared across the
//! pipeline modules.

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{GoroutineId, Pid, Tgid};

pub use errors::{MalformedRecord, ProbeError};
