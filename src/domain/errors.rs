//! Structured error types for goscope
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Fatal startup errors around the probe object and its attachment.
///
/// Every variant here aborts startup; nothing in this enum is retried.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to load probe object {path}: {error}")]
    ObjectLoadFailed { path: String, error: String },

    #[error("program not found: {0}")]
    ProgramNotFound(String),

    #[error("ring buffer map not found: {0}")]
    MapNotFound(String),

    #[error("Failed to attach {probe} to {target}: {error}")]
    AttachFailed { probe: String, target: String, error: String },

    #[error(transparent)]
    Program(#[from] aya::programs::ProgramError),

    #[error(transparent)]
    Map(#[from] aya::maps::MapError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A ring-buffer record too short to carry the fixed 24-byte event layout.
///
/// Never fatal: the record is dropped and the trace continues.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("short sample: {len} bytes")]
pub struct MalformedRecord {
    /// Observed record length, kept for diagnosing layout drift.
    pub len: usize,
}
