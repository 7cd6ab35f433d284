//! # Ring Buffer Reading
//!
//! Pulls raw records, one at a time, from the probe's ring buffer.
//!
//! The ring buffer fd is wrapped in a tokio [`AsyncFd`] so the consumer
//! blocks on epoll readiness instead of sleep-polling. The kernel may wake
//! the fd without a complete record being available; those empty wakeups
//! are benign, the guard is re-armed and the wait resumes.

use std::io;

use aya::maps::{MapData, RingBuf};
use tokio::io::unix::AsyncFd;
use tokio::io::Interest;

/// Source of raw probe records.
///
/// Seam between the kernel-backed [`EventReader`] and the processing loop;
/// tests script a source instead of loading a probe.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    /// Wait for the next raw record.
    ///
    /// # Errors
    /// I/O errors are transient from the caller's point of view; the
    /// processing loop retries rather than terminating.
    async fn next_record(&mut self) -> io::Result<Vec<u8>>;
}

/// Single consumer of the probe's ring buffer map.
pub struct EventReader {
    ring: AsyncFd<RingBuf<MapData>>,
}

impl EventReader {
    /// # Errors
    /// Fails if the ring buffer fd cannot be registered with the reactor.
    pub fn new(ring: RingBuf<MapData>) -> io::Result<Self> {
        Ok(Self { ring: AsyncFd::with_interest(ring, Interest::READABLE)? })
    }

    /// Block until one record is available and copy it out.
    ///
    /// # Errors
    /// Surfaces reactor-level I/O failures; never fails for an empty ring.
    pub async fn read(&mut self) -> io::Result<Vec<u8>> {
        loop {
            let mut guard = self.ring.readable_mut().await?;
            if let Some(record) = guard.get_inner_mut().next() {
                return Ok(record.to_vec());
            }
            // Woken with nothing consumable; re-arm and wait again.
            guard.clear_ready();
        }
    }
}

impl RecordSource for EventReader {
    async fn next_record(&mut self) -> io::Result<Vec<u8>> {
        self.read().await
    }
}
