// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod record;

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::cli::{CliArgs, Command, PipelineArgs, RunArgs};
use crate::config::{PipelineConfig, RunConfig, format_duration, load_and_validate};
use crate::engine::{Orchestrator, PollSchedule};
use crate::errors::OrchestratorError;
use crate::pipeline::{OrchestratorExecutor, PipelineRunner, StepRange};

/// High-level entry point used by `main.rs`.
///
/// Returns the exit code the process should terminate with.
pub async fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        Some(Command::Pipeline(pipeline_args)) => {
            if args.run.name.is_some() || args.run.cmd.is_some() {
                bail!("--name/--cmd cannot be combined with the pipeline subcommand");
            }
            run_pipeline(pipeline_args).await
        }
        None => run_single(&args.run).await,
    }
}

/// Single named run: exit code mirrors the child's.
async fn run_single(args: &RunArgs) -> Result<i32> {
    let cfg = run_config_from_args(args)?;
    let orchestrator = Orchestrator::new(cfg)?;
    let result = orchestrator.run().await?;
    Ok(result.process_exit_code())
}

/// Build the explicit run configuration from CLI flags.
pub fn run_config_from_args(args: &RunArgs) -> errors::Result<RunConfig> {
    let name = args
        .name
        .clone()
        .ok_or_else(|| OrchestratorError::config("--name is required"))?;
    let command = args
        .cmd
        .clone()
        .ok_or_else(|| OrchestratorError::config("--cmd is required"))?;

    let mut cfg = RunConfig::new(name, command).with_log_dir(&args.log_dir);

    if let Some(timeout) = args.timeout {
        cfg = cfg.with_timeout(timeout);
    }
    if !args.poll_schedule.is_empty() {
        cfg = cfg.with_poll_schedule(PollSchedule::new(args.poll_schedule.clone())?);
    }
    if args.no_markers {
        cfg = cfg.with_success_markers(Vec::<String>::new());
    } else if !args.markers.is_empty() {
        cfg = cfg.with_success_markers(args.markers.clone());
    }
    if let Some(ref shell) = args.shell {
        cfg = cfg.with_shell(shell.clone());
    }

    Ok(cfg)
}

async fn run_pipeline(args: PipelineArgs) -> Result<i32> {
    let pipeline = load_and_validate(&args.config)
        .with_context(|| format!("loading pipeline file {:?}", args.config))?;

    if args.list {
        print_steps(&pipeline, &mut io::stdout().lock())?;
        return Ok(0);
    }

    let range = StepRange {
        start_from: args.start_from,
        end_at: args.end_at,
    };

    let mut runner = PipelineRunner::new(OrchestratorExecutor::new());
    let outcome = runner.run(&pipeline, range).await?;

    println!("Steps executed: {}", outcome.summary.steps_executed);
    println!("Steps succeeded: {}", outcome.summary.steps_succeeded);
    println!("Steps failed: {}", outcome.summary.steps_failed);
    println!("Summary written to: {}", outcome.summary_path.display());

    Ok(if outcome.succeeded() { 0 } else { 1 })
}

fn print_steps(pipeline: &PipelineConfig, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Pipeline steps:")?;
    for (i, step) in pipeline.steps.iter().enumerate() {
        writeln!(out, "{i}. {}: {}", step.run.name, step.description)?;
        writeln!(out, "      cmd: {}", step.run.command)?;
        writeln!(out, "      timeout: {}", format_duration(step.run.timeout))?;
    }
    debug!("step listing complete (no execution)");
    Ok(())
}
