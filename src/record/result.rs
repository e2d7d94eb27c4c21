// src/record/result.rs

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::engine::RunStatus;

/// Persisted outcome of one run, `<log-dir>/<name>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    pub exit_code: Option<i32>,
    pub status: RunStatus,
    /// Everything captured, stderr lines prefixed with `ERROR: `.
    pub output: String,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub duration_seconds: Option<f64>,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Exit code for the orchestrator process itself: the child's code when
    /// known, otherwise 0 for success and 1 for anything else.
    pub fn process_exit_code(&self) -> i32 {
        match self.exit_code {
            Some(code) => code,
            None if self.succeeded() => 0,
            None => 1,
        }
    }
}

/// Aggregate record written once a pipeline stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub start_time: DateTime<Local>,
    pub steps_executed: usize,
    pub steps_succeeded: usize,
    pub steps_failed: usize,
    pub details: Vec<RunResult>,
}

impl PipelineSummary {
    pub fn from_results(start_time: DateTime<Local>, details: Vec<RunResult>) -> Self {
        let steps_succeeded = details.iter().filter(|r| r.succeeded()).count();
        Self {
            start_time,
            steps_executed: details.len(),
            steps_succeeded,
            steps_failed: details.len() - steps_succeeded,
            details,
        }
    }
}
