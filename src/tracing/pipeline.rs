//! # Trace Loop
//!
//! Composes reader → decoder → tracker → emitter per record and races the
//! whole loop against a shutdown future.
//!
//! The loop has exactly two states: running, and terminating once the
//! shutdown future resolves. Read errors and malformed records never leave
//! the running state; each record is processed to completion before
//! cancellation is acted on.

use std::future::Future;
use std::io::Write;

use anyhow::Result;
use log::{debug, warn};

use super::decoder;
use super::emitter::Emitter;
use super::reader::RecordSource;
use super::tracker::StateTracker;

/// Counters accumulated by one run of the trace loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraceStats {
    /// Records pulled off the ring buffer.
    pub records: u64,
    /// Lines written to the output sink.
    pub emitted: u64,
    /// Records suppressed as consecutive duplicates.
    pub suppressed: u64,
    /// Records shorter than the fixed layout.
    pub malformed: u64,
}

/// Run the trace loop until `shutdown` resolves.
///
/// The select is biased toward shutdown: once the signal is observed no
/// further read is issued. A read already resolved in the same poll is
/// still processed atomically inside its arm.
///
/// # Errors
/// Only output-sink write failures abort the loop; read failures are
/// retried (with a yield, so a persistently failing fd cannot busy-spin)
/// and malformed records are logged and dropped.
pub async fn run<S, W, F>(
    source: &mut S,
    tracker: &mut StateTracker,
    emitter: &mut Emitter<W>,
    shutdown: F,
) -> Result<TraceStats>
where
    S: RecordSource,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut stats = TraceStats::default();

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            result = source.next_record() => {
                let bytes = match result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        debug!("ring buffer read failed, retrying: {e}");
                        tokio::task::yield_now().await;
                        continue;
                    }
                };
                stats.records += 1;
                let event = match decoder::decode(&bytes) {
                    Ok(event) => event,
                    Err(e) => {
                        stats.malformed += 1;
                        warn!("{e}");
                        continue;
                    }
                };
                if tracker.observe(event.goid, event.state) {
                    emitter.emit(&event, bytes.len())?;
                    stats.emitted += 1;
                } else {
                    stats.suppressed += 1;
                }
            }
        }
    }

    Ok(stats)
}
