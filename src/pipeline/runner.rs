// src/pipeline/runner.rs

use std::path::PathBuf;

use chrono::Local;
use tracing::{error, info, warn};

use crate::config::{PipelineConfig, StepSpec};
use crate::errors::{OrchestratorError, Result};
use crate::pipeline::executor::StepExecutor;
use crate::record::{self, PipelineSummary, RunResult};

/// Inclusive slice of a pipeline to execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepRange {
    /// First step (0-based).
    pub start_from: usize,
    /// Last step (0-based, inclusive); `None` means the final step.
    pub end_at: Option<usize>,
}

impl StepRange {
    /// Resolve against a pipeline of `len` steps into a `start..=end` pair.
    pub fn resolve(&self, len: usize) -> Result<(usize, usize)> {
        if len == 0 {
            return Err(OrchestratorError::config("pipeline has no steps"));
        }
        let last = len - 1;

        if self.start_from > last {
            return Err(OrchestratorError::config(format!(
                "start-from must be between 0 and {last} (got {})",
                self.start_from
            )));
        }

        let end = self.end_at.unwrap_or(last);
        if end < self.start_from || end > last {
            return Err(OrchestratorError::config(format!(
                "end-at must be between {} and {last} (got {end})",
                self.start_from
            )));
        }

        Ok((self.start_from, end))
    }
}

/// What a finished pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub summary: PipelineSummary,
    /// Number of steps that were selected to run.
    pub selected: usize,
    pub summary_path: PathBuf,
}

impl PipelineOutcome {
    /// Every selected step ran and succeeded.
    pub fn succeeded(&self) -> bool {
        self.summary.steps_executed == self.selected && self.summary.steps_failed == 0
    }
}

/// Runs pipeline steps strictly one after another, stopping at the first
/// step that does not succeed.
pub struct PipelineRunner<E: StepExecutor> {
    executor: E,
}

impl<E: StepExecutor> PipelineRunner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn run(&mut self, pipeline: &PipelineConfig, range: StepRange) -> Result<PipelineOutcome> {
        let (start, end) = range.resolve(pipeline.steps.len())?;
        let selected = &pipeline.steps[start..=end];
        let start_time = Local::now();

        info!(start, end, "starting pipeline");

        let mut results = Vec::with_capacity(selected.len());
        for (index, step) in (start..).zip(selected) {
            info!(step = index, run = %step.run.name, "== {} ==", step.description);

            match self.executor.execute(step.run.clone()).await {
                Ok(result) => {
                    let ok = result.succeeded();
                    if !ok {
                        report_failed_step(index, step, &result);
                    }
                    results.push(result);
                    if !ok {
                        warn!("pipeline stopped due to step failure");
                        break;
                    }
                }
                Err(err) => {
                    error!(
                        step = index,
                        run = %step.run.name,
                        error = %err,
                        "no result record for step; stopping pipeline"
                    );
                    break;
                }
            }
        }

        let summary = PipelineSummary::from_results(start_time, results);
        let summary_path = record::write_summary(&pipeline.log_dir, &summary)?;

        info!(
            executed = summary.steps_executed,
            succeeded = summary.steps_succeeded,
            failed = summary.steps_failed,
            path = ?summary_path,
            "pipeline summary written"
        );

        Ok(PipelineOutcome {
            summary,
            selected: selected.len(),
            summary_path,
        })
    }
}

fn report_failed_step(index: usize, step: &StepSpec, result: &RunResult) {
    warn!(
        step = index,
        run = %step.run.name,
        status = %result.status,
        exit_code = ?result.exit_code,
        "step failed: {}",
        step.description
    );
    for line in result.output.lines() {
        warn!(run = %step.run.name, "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_covers_everything() -> Result<()> {
        assert_eq!(StepRange::default().resolve(6)?, (0, 5));
        Ok(())
    }

    #[test]
    fn explicit_range_is_inclusive() -> Result<()> {
        let range = StepRange {
            start_from: 2,
            end_at: Some(3),
        };
        assert_eq!(range.resolve(6)?, (2, 3));
        Ok(())
    }

    #[test]
    fn rejects_out_of_bounds_ranges() {
        let bad = [
            StepRange { start_from: 6, end_at: None },
            StepRange { start_from: 3, end_at: Some(2) },
            StepRange { start_from: 0, end_at: Some(6) },
        ];
        for range in bad {
            assert!(range.resolve(6).is_err(), "{range:?}");
        }
        assert!(StepRange::default().resolve(0).is_err());
    }
}
