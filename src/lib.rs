//! # goscope - eBPF Goroutine Scheduling-State Tracer
//!
//! goscope watches goroutine state transitions inside a running Go process
//! from the outside. It attaches a uprobe to the runtime's state-change
//! function (`runtime.casgstatus` by default), receives a fixed-layout
//! binary record per transition through a BPF ring buffer, and prints a
//! live, deduplicated trace.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Target Go Process (any binary)        │
//! │      runtime.casgstatus(g, old, new)         │
//! └───────────────────┬──────────────────────────┘
//!                     │ uprobe fires (kernel)
//!                     ▼
//! ┌──────────────────────────────────────────────┐
//! │   Probe Object (precompiled BPF artifact)    │
//! │   writes 24-byte records to ring buffer      │
//! └───────────────────┬──────────────────────────┘
//!                     │ ring buffer
//!                     ▼
//! ┌──────────────────────────────────────────────┐
//! │             goscope (this crate)             │
//! │  reader ─▶ decoder ─▶ tracker ─▶ emitter     │
//! │              (racing a shutdown signal)      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`probe`]: Load the precompiled BPF object and manage uprobe/kprobe
//!   attachments (programs and maps are resolved by exact name)
//! - [`tracing`]: The event pipeline — record decoding, per-goroutine
//!   dedup, line formatting, the async ring-buffer reader, and the
//!   shutdown-aware processing loop
//! - [`trace_pipe`]: Secondary raw-text mode that tails the kernel's
//!   `trace_pipe` after attaching a kprobe
//! - [`preflight`]: Privilege/kernel/binary checks before anything loads
//! - [`cli`]: Command-line argument parsing
//! - [`domain`]: Identifier newtypes and structured errors
//!
//! ## Typical Usage
//!
//! ```bash
//! # Trace every process running ./server
//! sudo goscope trace --target ./server --probe-object ./server.bpf.o
//!
//! # Scope to one PID, keep duplicate states
//! sudo goscope trace --target ./server --probe-object ./server.bpf.o \
//!     --pid 1234 --no-dedup
//! ```
//!
//! ## Key Concepts
//!
//! - **Uprobe**: kernel instrumentation point on a userspace function
//! - **Ring buffer**: lock-free kernel→userspace event queue (Linux 5.8+)
//! - **goid**: goroutine id assigned by the Go runtime, the dedup key
//! - **Dedup**: suppression of an observation that repeats the last
//!   *emitted* state for the same goid

pub mod cli;
pub mod domain;
pub mod preflight;
pub mod probe;
pub mod trace_pipe;
pub mod tracing;
