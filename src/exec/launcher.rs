// src/exec/launcher.rs

use std::process::Stdio;
use std::time::Instant;

use chrono::{DateTime, Local};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::errors::{OrchestratorError, Result};

/// A freshly spawned child with its pipes split off.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub child: Child,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
    /// Monotonic start, used for timeout bookkeeping.
    pub started_at: Instant,
    /// Wall-clock start, used for the record.
    pub start_time: DateTime<Local>,
}

/// Start the run's command through the shell with both output streams piped.
pub fn launch(cfg: &RunConfig) -> Result<LaunchedProcess> {
    info!(run = %cfg.name, cmd = %cfg.command, "starting command");
    spawn(shell_command(cfg), &cfg.name)
}

/// Build a shell command appropriate for the platform (or the configured
/// interpreter).
fn shell_command(cfg: &RunConfig) -> Command {
    let mut cmd = match cfg.shell {
        Some(ref shell) => {
            let mut c = std::process::Command::new(shell);
            c.arg("-c").arg(&cfg.command);
            c
        }
        None if cfg!(windows) => {
            let mut c = std::process::Command::new("cmd");
            c.arg("/C").arg(&cfg.command);
            c
        }
        None => {
            let mut c = std::process::Command::new("sh");
            c.arg("-c").arg(&cfg.command);
            c
        }
    };

    // Own process group, so termination reaches the shell's children too.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    Command::from(cmd)
}

fn spawn(mut cmd: Command, name: &str) -> Result<LaunchedProcess> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start_time = Local::now();
    let started_at = Instant::now();

    let mut child = cmd.spawn().map_err(|source| OrchestratorError::Launch {
        name: name.to_string(),
        source,
    })?;

    let missing_pipe = |which: &str| OrchestratorError::Launch {
        name: name.to_string(),
        source: std::io::Error::other(format!("child {which} pipe was not captured")),
    };
    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    debug!(run = %name, pid = ?child.id(), "process spawned");

    Ok(LaunchedProcess {
        child,
        stdout,
        stderr,
        started_at,
        start_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_interpreter_is_a_launch_error() {
        let cfg = RunConfig::new("no-shell", "echo hi").with_shell("/nonexistent/interpreter");
        match launch(&cfg) {
            Err(OrchestratorError::Launch { name, .. }) => assert_eq!(name, "no-shell"),
            other => panic!("expected launch error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launched_child_runs_the_command() -> Result<()> {
        let mut launched = launch(&RunConfig::new("exit-four", "exit 4"))?;
        let status = launched.child.wait().await?;
        assert_eq!(status.code(), Some(4));
        Ok(())
    }
}
