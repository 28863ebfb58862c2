//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Subsync - quota-aware user attribute dispatch scheduler
#[derive(Parser, Debug)]
#[command(
    name = "subsync",
    author,
    version,
    about = "Quota-aware dispatch of user attribute updates",
    long_about = "Dispatches pending user attribute updates to a third-party service\n\
                  through its bulk and single-record endpoints, respecting both\n\
                  rolling hourly quotas, with retries, rate-limit cooldowns and a\n\
                  failure breaker."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SUBSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SUBSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one scheduling pass over a pending update set
    Run(RunArgs),

    /// Validate a plan file without running
    Validate(ValidateArgs),

    /// Display the effective plan and quota budget
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to plan file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "SUBSYNC_PLAN")]
    pub plan: Option<PathBuf>,

    /// Update set as a JSON batches document
    #[arg(short, long, env = "SUBSYNC_INPUT")]
    pub input: Option<PathBuf>,

    /// Generate a demo update set of this many records (0 = disabled)
    #[arg(long, default_value = "0", env = "SUBSYNC_DEMO_RECORDS")]
    pub demo_records: usize,

    /// Override the worker count from the plan
    #[arg(long, env = "SUBSYNC_WORKERS")]
    pub workers: Option<usize>,

    /// Abort the run after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "SUBSYNC_TIMEOUT")]
    pub timeout: u64,

    /// Validate inputs and print the partition summary without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "SUBSYNC_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to plan file to validate
    #[arg(short, long, default_value = "subsync.toml")]
    pub plan: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to plan file; defaults apply when omitted
    #[arg(short, long)]
    pub plan: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
