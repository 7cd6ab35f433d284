//! Trace line formatting and output.

use std::io::{self, Write};

use super::decoder::StateEvent;

/// Render one trace line for an emitted event.
///
/// The raw byte length of the originating record is included so drift
/// between the probe's struct layout and ours shows up in the output.
#[must_use]
pub fn format_line(event: &StateEvent, raw_len: usize) -> String {
    format!(
        "pid={} tgid={} goid={} state={} ({}) (raw={} bytes)",
        event.pid.0,
        event.tgid.0,
        event.goid.0,
        event.state,
        event.state.raw(),
        raw_len
    )
}

/// Writes trace lines to an output sink, one per emitted event.
pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// # Errors
    /// Propagates write failures from the underlying sink.
    pub fn emit(&mut self, event: &StateEvent, raw_len: usize) -> io::Result<()> {
        writeln!(self.out, "{}", format_line(event, raw_len))
    }
}
