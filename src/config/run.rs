// src/config/run.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::engine::PollSchedule;

pub const DEFAULT_LOG_DIR: &str = "scripts/logs";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_TERMINATION_GRACE: Duration = Duration::from_secs(5);
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_SUCCESS_MARKERS: [&str; 5] = ["DONE", "OK", "Success", "Finished", "Complete"];

/// Everything one orchestrated run needs, passed explicitly to the driver.
///
/// `command` is handed to the shell verbatim. It is trusted input from
/// deployment scripts and is neither escaped nor sandboxed.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Run identifier; also the result record's file stem.
    pub name: String,
    pub command: String,
    pub log_dir: PathBuf,
    pub timeout: Duration,
    pub poll_schedule: PollSchedule,
    /// Substrings whose appearance in the output counts as early success.
    pub success_markers: Vec<String>,
    /// Interpreter invoked as `<shell> -c <command>`; `None` means the
    /// platform shell.
    pub shell: Option<String>,
    /// Wait between the graceful stop request and the forced kill.
    pub termination_grace: Duration,
    /// Upper bound on waiting for the output readers after the run settles.
    pub drain_grace: Duration,
}

impl RunConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            timeout: DEFAULT_TIMEOUT,
            poll_schedule: PollSchedule::default(),
            success_markers: default_success_markers(),
            shell: None,
            termination_grace: DEFAULT_TERMINATION_GRACE,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_schedule(mut self, schedule: PollSchedule) -> Self {
        self.poll_schedule = schedule;
        self
    }

    pub fn with_success_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.success_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    pub fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace = grace;
        self
    }

    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }
}

pub fn default_success_markers() -> Vec<String> {
    DEFAULT_SUCCESS_MARKERS.iter().map(|s| s.to_string()).collect()
}
