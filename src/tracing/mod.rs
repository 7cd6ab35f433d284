//! Trace pipeline core
//!
//! Everything between the ring buffer and stdout:
//! - Record decoding (fixed 24-byte layout → typed events)
//! - Per-goroutine dedup of consecutive states
//! - Line formatting and output
//! - Async ring-buffer reading
//! - The shutdown-aware processing loop

pub mod decoder;
pub mod emitter;
pub mod pipeline;
pub mod reader;
pub mod tracker;

// Re-export common types
pub use decoder::{decode, GoroutineState, StateEvent, RECORD_LEN};
pub use emitter::{format_line, Emitter};
pub use pipeline::TraceStats;
pub use reader::{EventReader, RecordSource};
pub use tracker::StateTracker;
