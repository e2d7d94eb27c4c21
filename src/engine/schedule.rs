// src/engine/schedule.rs

use std::time::Duration;

use crate::errors::{OrchestratorError, Result};

/// Escalating poll schedule: short waits first, longer ones later.
///
/// Tick `i` waits `intervals[i]`; once the list is exhausted the last
/// interval repeats. Waits are always clamped to the time left before the
/// run's timeout, so the final check lands on the deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    intervals: Vec<Duration>,
}

impl PollSchedule {
    pub fn new(intervals: Vec<Duration>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(OrchestratorError::config(
                "poll schedule must contain at least one interval",
            ));
        }
        if let Some(pos) = intervals.iter().position(|d| d.is_zero()) {
            return Err(OrchestratorError::config(format!(
                "poll schedule interval #{pos} must be greater than zero"
            )));
        }
        Ok(Self { intervals })
    }

    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }

    /// Scheduled interval for the given tick (0-based).
    pub fn interval_at(&self, tick: usize) -> Duration {
        let last = self.intervals.len() - 1;
        self.intervals[tick.min(last)]
    }

    /// How long to sleep before check number `tick`, given the time already
    /// spent and the overall timeout.
    pub fn next_wait(&self, tick: usize, elapsed: Duration, timeout: Duration) -> Duration {
        self.interval_at(tick).min(timeout.saturating_sub(elapsed))
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            intervals: [2, 5, 10, 30, 60, 120, 300]
                .into_iter()
                .map(Duration::from_secs)
                .collect(),
        }
    }
}
