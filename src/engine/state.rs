// src/engine/state.rs

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::exec::OutputBuffer;
use crate::record::RunResult;

/// Lifecycle of a run: `Running` until exactly one terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Success,
    Failure,
    Timeout,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failure => "failure",
            RunStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one run, owned by its driver.
///
/// The output buffer is filled by the collector; status, exit code and end
/// time change only through [`RunState::finish`].
#[derive(Debug)]
pub struct RunState {
    name: String,
    status: RunStatus,
    exit_code: Option<i32>,
    output: OutputBuffer,
    started_at: Option<Instant>,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
}

impl RunState {
    pub fn new(name: impl Into<String>, output: OutputBuffer) -> Self {
        Self {
            name: name.into(),
            status: RunStatus::Running,
            exit_code: None,
            output,
            started_at: None,
            start_time: None,
            end_time: None,
        }
    }

    pub fn mark_started(&mut self, started_at: Instant, start_time: DateTime<Local>) {
        self.started_at = Some(started_at);
        self.start_time = Some(start_time);
    }

    /// Move to a terminal status and stamp the end time.
    ///
    /// Returns `false` (and changes nothing) if the run already finished.
    pub fn finish(&mut self, status: RunStatus, exit_code: Option<i32>) -> bool {
        if self.status.is_terminal() {
            warn!(
                run = %self.name,
                current = %self.status,
                requested = %status,
                "ignoring second terminal transition"
            );
            return false;
        }
        if !status.is_terminal() {
            warn!(run = %self.name, "finish called with non-terminal status");
            return false;
        }

        self.status = status;
        self.exit_code = exit_code;
        self.end_time = Some(Local::now());

        info!(
            run = %self.name,
            %status,
            exit_code = ?exit_code,
            elapsed_ms = self.started_at.map(|t| t.elapsed().as_millis() as u64),
            "run finished"
        );
        true
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    /// Freeze the state into its persisted shape.
    pub fn into_result(self) -> RunResult {
        let duration_seconds = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start)
                .num_microseconds()
                .map(|us| us as f64 / 1_000_000.0),
            _ => None,
        };

        RunResult {
            name: self.name,
            exit_code: self.exit_code,
            status: self.status,
            output: self.output.snapshot(),
            start_time: self.start_time,
            end_time: self.end_time,
            duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::OutputStream;

    #[test]
    fn only_the_first_terminal_transition_sticks() {
        let mut state = RunState::new("t", OutputBuffer::new());
        state.mark_started(Instant::now(), Local::now());

        assert!(state.finish(RunStatus::Success, Some(0)));
        assert!(!state.finish(RunStatus::Timeout, None));
        assert_eq!(state.status(), RunStatus::Success);
        assert_eq!(state.exit_code(), Some(0));
    }

    #[test]
    fn running_is_not_a_valid_finish() {
        let mut state = RunState::new("t", OutputBuffer::new());
        assert!(!state.finish(RunStatus::Running, None));
        assert_eq!(state.status(), RunStatus::Running);
    }

    #[test]
    fn result_carries_output_and_duration() {
        let output = OutputBuffer::new();
        let mut state = RunState::new("t", output.clone());
        state.mark_started(Instant::now(), Local::now());
        output.append_line(OutputStream::Stdout, "hello");
        state.finish(RunStatus::Failure, Some(2));

        let result = state.into_result();
        assert_eq!(result.output, "hello\n");
        assert_eq!(result.exit_code, Some(2));
        assert!(result.duration_seconds.is_some_and(|d| d >= 0.0));
    }

    #[test]
    fn unstarted_run_has_no_duration() {
        let mut state = RunState::new("t", OutputBuffer::new());
        state.finish(RunStatus::Failure, None);
        let result = state.into_result();
        assert!(result.start_time.is_none());
        assert!(result.duration_seconds.is_none());
    }
}
