//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "goscope",
    about = "Trace goroutine scheduling states in a running Go process via eBPF",
    after_help = "\
EXAMPLES:
    sudo goscope trace --target ./server --probe-object ./server.bpf.o
    sudo goscope trace --target ./server --probe-object ./server.bpf.o --pid 1234
    sudo goscope pipe --probe-object ./hello.bpf.o"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Attach the state-change uprobe and stream decoded events
    Trace(TraceArgs),
    /// Attach a kprobe and tail the raw kernel trace_pipe
    Pipe(PipeArgs),
}

#[derive(clap::Args)]
pub struct TraceArgs {
    /// Path to the Go binary to attach the uprobe to
    #[arg(short, long, default_value = "./main")]
    pub target: String,

    /// Symbol name to attach the uprobe to
    #[arg(short, long, default_value = "runtime.casgstatus")]
    pub symbol: String,

    /// Path to the compiled BPF object
    #[arg(short = 'o', long, value_name = "FILE", default_value = "./main.bpf.o")]
    pub probe_object: PathBuf,

    /// Attach only to this PID (0 = all processes using the binary)
    #[arg(short, long, default_value = "0")]
    pub pid: i32,

    /// Emit every observation instead of suppressing consecutive
    /// duplicate states per goroutine
    #[arg(long)]
    pub no_dedup: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(clap::Args)]
pub struct PipeArgs {
    /// Path to the compiled BPF object
    #[arg(short = 'o', long, value_name = "FILE", default_value = "./hello.bpf.o")]
    pub probe_object: PathBuf,

    /// Program name inside the probe object
    #[arg(long, default_value = "hello")]
    pub program: String,

    /// Kernel function to attach the kprobe to
    #[arg(long, default_value = "__x64_sys_execve")]
    pub function: String,
}
