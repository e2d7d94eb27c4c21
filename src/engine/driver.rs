// src/engine/driver.rs

use std::time::{Duration, Instant};

use chrono::Local;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::config::{RunConfig, validate_run_config};
use crate::engine::poller::{PollOutcome, Poller};
use crate::engine::state::{RunState, RunStatus};
use crate::errors::Result;
use crate::exec::{Collector, OutputBuffer, OutputStream, launch, terminate};
use crate::record::{self, RunResult};

/// Slack on top of the run timeout before the driver stops trusting the
/// poller and terminates the child itself.
const CEILING_SLACK: Duration = Duration::from_secs(1);

/// Synchronous-looking entry point for one named run.
///
/// `run` always produces a result record unless writing that record fails;
/// launch, stream and termination problems end up in the record's status and
/// output instead of being returned.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: RunConfig,
    /// Replaces `timeout + CEILING_SLACK` when set.
    ceiling: Option<Duration>,
}

impl Orchestrator {
    /// Validates the configuration up front so that a bad name can never
    /// reach the record store.
    pub fn new(config: RunConfig) -> Result<Self> {
        validate_run_config(&config)?;
        Ok(Self {
            config,
            ceiling: None,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub(crate) fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// Hard upper bound on how long the poller may run.
    fn ceiling(&self) -> Duration {
        self.ceiling
            .unwrap_or_else(|| self.config.timeout.saturating_add(CEILING_SLACK))
    }

    /// Launch, poll, terminate if needed, record.
    pub async fn run(&self) -> Result<RunResult> {
        let state = self.execute().await;
        let result = state.into_result();

        match record::write_result(&self.config.log_dir, &result) {
            Ok(path) => info!(run = %result.name, status = %result.status, path = ?path, "results written"),
            Err(err) => {
                error!(run = %result.name, error = %err, "could not persist run result");
                return Err(err);
            }
        }

        Ok(result)
    }

    async fn execute(&self) -> RunState {
        let cfg = &self.config;
        let output = OutputBuffer::new();
        let mut state = RunState::new(&cfg.name, output.clone());

        let launched = match launch(cfg) {
            Ok(launched) => launched,
            Err(err) => {
                error!(run = %cfg.name, error = %err, "launch failed");
                state.mark_started(Instant::now(), Local::now());
                output.append_line(OutputStream::Stderr, &err.to_string());
                state.finish(RunStatus::Failure, None);
                return state;
            }
        };

        state.mark_started(launched.started_at, launched.start_time);
        let started_at = launched.started_at;
        let mut child = launched.child;
        let collector = Collector::spawn(&cfg.name, launched.stdout, launched.stderr, output.clone());

        // Hard ceiling independent of the poller's own timeout bookkeeping.
        let ceiling = self.ceiling();
        let poller = Poller::new(cfg, output, started_at);
        let outcome = timeout(ceiling, poller.poll(&mut child)).await;

        match outcome {
            Ok(PollOutcome::Exited(code)) => {
                let status = if code == Some(0) {
                    RunStatus::Success
                } else {
                    RunStatus::Failure
                };
                state.finish(status, code);
            }
            Ok(PollOutcome::MarkerMatched(marker)) => {
                info!(run = %cfg.name, marker = %marker, "completed on success marker; stopping process");
                let report = terminate(&cfg.name, &mut child, cfg.termination_grace).await;
                state.finish(RunStatus::Success, report.exit_code);
            }
            Ok(PollOutcome::TimedOut) => {
                warn!(
                    run = %cfg.name,
                    timeout_ms = cfg.timeout.as_millis() as u64,
                    "command timed out; stopping process"
                );
                let report = terminate(&cfg.name, &mut child, cfg.termination_grace).await;
                state.finish(RunStatus::Timeout, report.exit_code);
            }
            Err(_) => {
                warn!(
                    run = %cfg.name,
                    ceiling_ms = ceiling.as_millis() as u64,
                    "poller did not settle before the hard ceiling; stopping process"
                );
                let report = terminate(&cfg.name, &mut child, cfg.termination_grace).await;
                state.finish(RunStatus::Timeout, report.exit_code);
            }
        }

        // Output flushed right at exit may still be in the pipes.
        if !collector.drain(cfg.drain_grace).await {
            warn!(run = %cfg.name, "output may be truncated");
        }

        state
    }
}
