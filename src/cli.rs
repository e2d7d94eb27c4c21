// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{default_pipeline_path, parse_duration};

/// Command-line arguments for `orchestrator`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "orchestrator",
    version,
    about = "Run a shell command with escalating polling, success markers and a hard timeout.",
    long_about = None,
    subcommand_negates_reqs = true
)]
pub struct CliArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// Accepted before or after the `pipeline` subcommand. If omitted,
    /// `ORCHESTRATOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,
}

/// Single-run mode: the default when no subcommand is given.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Name for this run; the result is written to `<log-dir>/<name>.json`.
    #[arg(long, value_name = "ID", required = true)]
    pub name: Option<String>,

    /// Shell command to execute (passed verbatim to the shell).
    #[arg(long = "cmd", value_name = "COMMAND", required = true)]
    pub cmd: Option<String>,

    /// Directory for result records.
    #[arg(long, value_name = "PATH", default_value = "scripts/logs")]
    pub log_dir: PathBuf,

    /// Hard timeout, e.g. `300s`, `5m` or a bare number of seconds.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Comma-separated poll intervals, e.g. `2s,5s,10s`.
    #[arg(long, value_name = "DURATIONS", value_delimiter = ',', value_parser = parse_duration)]
    pub poll_schedule: Vec<Duration>,

    /// Success marker; repeat to give several. Replaces the default set.
    #[arg(long = "marker", value_name = "TEXT")]
    pub markers: Vec<String>,

    /// Disable early success on output markers.
    #[arg(long, conflicts_with = "markers")]
    pub no_markers: bool,

    /// Interpreter to run the command with (`<shell> -c <command>`).
    #[arg(long, value_name = "PROGRAM")]
    pub shell: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the steps of a pipeline file one after another.
    Pipeline(PipelineArgs),
}

#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Path to the pipeline file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_pipeline_path())]
    pub config: PathBuf,

    /// Step to start from (0-based).
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub start_from: usize,

    /// Step to end at (0-based, inclusive).
    #[arg(long, value_name = "INDEX")]
    pub end_at: Option<usize>,

    /// List the pipeline steps and exit.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
