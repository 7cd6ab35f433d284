//! # Raw trace_pipe Tailer
//!
//! Secondary mode with no decoding and no state: attach a kprobe from a
//! probe object, then stream the kernel's debug trace output line-by-line.
//! Anything the probe prints with `bpf_printk` shows up here.

use std::future::Future;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{anyhow, Result};
use log::warn;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Default tracefs pipe location.
pub const TRACE_PIPE: &str = "/sys/kernel/debug/tracing/trace_pipe";

/// Tail `path` to `out` until EOF, a read error, or `shutdown` resolves.
///
/// # Errors
/// Fails if the pipe cannot be opened (with a tracefs-mount hint when the
/// path is missing) or if writing to the sink fails. Read errors mid-stream
/// are logged and end the tail without failing it.
pub async fn tail<W, F>(path: &Path, out: &mut W, shutdown: F) -> Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    let file = File::open(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            anyhow!(
                "failed to open {}: {e}\n\
                 Hint: mount tracefs: sudo mount -t tracefs nodev /sys/kernel/debug/tracing",
                path.display()
            )
        } else {
            anyhow!("failed to open {}: {e}\nHint: try running with sudo.", path.display())
        }
    })?;

    let mut lines = BufReader::new(file).lines();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => writeln!(out, "{line}")?,
                Ok(None) => break,
                Err(e) => {
                    warn!("trace_pipe read error: {e}");
                    break;
                }
            }
        }
    }

    Ok(())
}
