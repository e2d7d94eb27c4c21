// src/engine/poller.rs

use std::time::{Duration, Instant};

use tokio::process::Child;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::engine::PollSchedule;
use crate::exec::{OutputBuffer, exit_code};

/// Why the poller stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The child exited on its own.
    Exited(Option<i32>),
    /// A success marker showed up while the child was still running.
    MarkerMatched(String),
    /// The timeout passed with the child still running and no marker seen.
    TimedOut,
}

/// Completion poller for one run.
///
/// Between ticks the poller sleeps for the scheduled interval but wakes early
/// if the child exits. On every tick it checks, in order: process exited,
/// success marker present, timeout reached.
#[derive(Debug)]
pub struct Poller<'a> {
    name: &'a str,
    schedule: &'a PollSchedule,
    markers: &'a [String],
    timeout: Duration,
    output: OutputBuffer,
    started_at: Instant,
}

impl<'a> Poller<'a> {
    pub fn new(cfg: &'a RunConfig, output: OutputBuffer, started_at: Instant) -> Self {
        Self {
            name: &cfg.name,
            schedule: &cfg.poll_schedule,
            markers: &cfg.success_markers,
            timeout: cfg.timeout,
            output,
            started_at,
        }
    }

    /// Poll until the run reaches a terminal condition.
    ///
    /// The poller never signals the child; stopping it is the caller's job.
    pub async fn poll(&self, child: &mut Child) -> PollOutcome {
        let mut tick = 0usize;

        loop {
            let wait = self
                .schedule
                .next_wait(tick, self.started_at.elapsed(), self.timeout);

            let exited = tokio::select! {
                status = child.wait() => Some(status),
                _ = sleep(wait) => None,
            };

            match exited {
                Some(Ok(status)) => {
                    let code = exit_code(status);
                    info!(run = %self.name, exit_code = ?code, "process exited");
                    return PollOutcome::Exited(code);
                }
                Some(Err(e)) => {
                    // Fall back to the plain tick sleep so a broken wait
                    // cannot spin this loop.
                    warn!(run = %self.name, error = %e, "waiting on process failed");
                    sleep(wait).await;
                }
                None => {}
            }

            tick += 1;
            let elapsed = self.started_at.elapsed();

            match child.try_wait() {
                Ok(Some(status)) => {
                    let code = exit_code(status);
                    info!(run = %self.name, exit_code = ?code, "process exited");
                    return PollOutcome::Exited(code);
                }
                Ok(None) => {}
                Err(e) => warn!(run = %self.name, error = %e, "could not query process state"),
            }

            if let Some(marker) = self.output.find_marker(self.markers) {
                info!(
                    run = %self.name,
                    marker,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "success marker found in output"
                );
                return PollOutcome::MarkerMatched(marker.to_string());
            }

            if elapsed >= self.timeout {
                warn!(
                    run = %self.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "run timed out"
                );
                return PollOutcome::TimedOut;
            }

            debug!(
                run = %self.name,
                tick,
                elapsed_ms = elapsed.as_millis() as u64,
                "still running"
            );
        }
    }
}
