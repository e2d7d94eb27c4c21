// src/exec/mod.rs

//! Process execution layer.
//!
//! This module owns everything that touches the child process directly,
//! using `tokio::process::Command`:
//!
//! - [`launcher`] spawns the shell command with piped stdout/stderr.
//! - [`collector`] drains both pipes into the shared [`OutputBuffer`].
//! - [`terminator`] stops a still-running child (graceful, then forced).

pub mod collector;
pub mod launcher;
pub mod terminator;

use std::fmt;
use std::process::ExitStatus;

pub use collector::{Collector, OutputBuffer};
pub use launcher::{LaunchedProcess, launch};
pub use terminator::{TerminationReport, terminate};

/// Which pipe a line of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Exit code of a finished child.
///
/// A child killed by signal `n` reports `-n` on Unix so that forced kills
/// still leave a code in the record.
#[cfg(unix)]
pub fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|sig| -sig))
}

#[cfg(not(unix))]
pub fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}
