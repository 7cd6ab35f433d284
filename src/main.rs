//! # goscope - Main Entry Point
//!
//! Two modes:
//! - **trace** (the core pipeline): uprobe → ring buffer → decode →
//!   dedup → stdout
//! - **pipe**: kprobe + raw `trace_pipe` tailing, no decoding
//!
//! Both run until SIGINT/SIGTERM, then release their probe attachments and
//! exit cleanly.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::io;
use std::path::Path;
use tokio::signal::unix::{signal, SignalKind};

use goscope::cli::{Args, Command, PipeArgs, TraceArgs};
use goscope::preflight::{check_privileges, run_preflight_checks};
use goscope::probe::{ProbeManager, EVENT_MAP, STATE_PROGRAM};
use goscope::trace_pipe;
use goscope::tracing::{pipeline, Emitter, EventReader, StateTracker};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else if msg.contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Trace(trace) => run_trace(trace).await,
        Command::Pipe(pipe) => run_pipe(pipe).await,
    }
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("failed to install SIGTERM handler: {e}");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

async fn run_trace(args: TraceArgs) -> Result<()> {
    let target = std::fs::canonicalize(&args.target)
        .with_context(|| format!("Failed to resolve path: {}", args.target))?
        .to_string_lossy()
        .into_owned();

    run_preflight_checks(&target)?;

    let mut probe = ProbeManager::load(&args.probe_object)?;
    let pid = (args.pid > 0).then_some(args.pid);
    probe.attach_uprobe(STATE_PROGRAM, &target, &args.symbol, pid)?;

    let ring = probe.take_ring_buf(EVENT_MAP)?;
    let mut reader = EventReader::new(ring).context("Failed to register ring buffer fd")?;

    if !args.quiet {
        println!("goscope v{}", env!("CARGO_PKG_VERSION"));
        println!("Attached uprobe {} -> {}; reading ring buffer...", args.symbol, target);
    }

    let mut tracker = StateTracker::new(!args.no_dedup);
    let mut emitter = Emitter::new(io::stdout());

    let stats =
        pipeline::run(&mut reader, &mut tracker, &mut emitter, shutdown_signal()).await?;

    println!("signal received; exiting");
    if !args.quiet {
        eprintln!(
            "{} records ({} emitted, {} suppressed, {} malformed, {} goroutines seen)",
            stats.records, stats.emitted, stats.suppressed, stats.malformed, tracker.tracked()
        );
    }

    // Release the ring buffer fd before tearing down the attachment.
    drop(reader);
    probe.detach();

    Ok(())
}

async fn run_pipe(args: PipeArgs) -> Result<()> {
    check_privileges()?;

    let mut probe = ProbeManager::load(&args.probe_object)?;
    probe.attach_kprobe(&args.program, &args.function)?;

    println!("kprobe attached; streaming trace_pipe...");

    let mut out = io::stdout();
    trace_pipe::tail(Path::new(trace_pipe::TRACE_PIPE), &mut out, shutdown_signal()).await?;

    println!("Cleaning up");
    probe.detach();

    Ok(())
}
