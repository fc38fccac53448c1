//! CLI type definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "call-handoff")]
#[command(about = "Hand call presentation off to the host's native telephony UI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .call-handoff/
    #[arg(short, long, global = true, env = "CALL_HANDOFF_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run calls through the orchestrator against a simulated host
    Simulate(SimulateArgs),

    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Number of calls to background, one after another
    #[arg(short = 'n', long, default_value = "3")]
    pub calls: usize,

    /// Strategy to try first for every call
    #[arg(short, long)]
    pub preferred: Option<String>,

    /// Host supports only a single scene
    #[arg(long)]
    pub single_scene: bool,

    /// Native UI provider bridge is not installed
    #[arg(long)]
    pub no_bridge: bool,

    /// Host refuses window presentation changes
    #[arg(long)]
    pub window_refuses: bool,

    /// Host refuses background task requests
    #[arg(long)]
    pub refuse_background_tasks: bool,

    /// Delay applied to every host call, in milliseconds
    #[arg(long, default_value = "0")]
    pub latency_ms: u64,

    /// Pretend the process uses this much resident memory instead of sampling it
    #[arg(long)]
    pub resident_mb: Option<u64>,
}
