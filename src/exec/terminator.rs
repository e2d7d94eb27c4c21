// src/exec/terminator.rs

use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::errors::OrchestratorError;
use crate::exec::exit_code;

/// What happened while stopping a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationReport {
    /// Exit code observed after termination, if the child could be reaped.
    pub exit_code: Option<i32>,
    /// The child had already exited; nothing was signalled.
    pub already_exited: bool,
    /// The grace period ran out and the child was killed.
    pub forced: bool,
}

/// Stop a child: ask it to terminate, wait up to `grace`, then kill it.
///
/// Calling this on a child that has already exited only reports its exit
/// code, so repeated calls yield the same report code.
pub async fn terminate(name: &str, child: &mut Child, grace: Duration) -> TerminationReport {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(run = %name, "process already exited; nothing to terminate");
            return TerminationReport {
                exit_code: exit_code(status),
                already_exited: true,
                forced: false,
            };
        }
        Ok(None) => {}
        Err(e) => warn!(run = %name, error = %e, "could not query process state before terminating"),
    }

    info!(run = %name, grace_ms = grace.as_millis() as u64, "requesting graceful termination");
    if let Err(err) = request_stop(name, child) {
        warn!(error = %err, "graceful termination request failed");
    }

    match timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            let code = exit_code(status);
            info!(run = %name, exit_code = ?code, "process exited after termination request");
            TerminationReport {
                exit_code: code,
                already_exited: false,
                forced: false,
            }
        }
        Ok(Err(e)) => {
            error!(run = %name, error = %e, "failed waiting for process after termination request");
            TerminationReport {
                exit_code: None,
                already_exited: false,
                forced: false,
            }
        }
        Err(_) => {
            warn!(run = %name, "grace period elapsed; killing process");
            force_kill(name, child).await
        }
    }
}

async fn force_kill(name: &str, child: &mut Child) -> TerminationReport {
    #[cfg(unix)]
    {
        if let Err(err) = signal_group(name, child, nix::sys::signal::Signal::SIGKILL) {
            debug!(error = %err, "process group kill failed; falling back to direct kill");
        }
    }

    let code = match child.kill().await {
        Ok(()) => child.try_wait().ok().flatten().and_then(exit_code),
        Err(source) => {
            let err = OrchestratorError::Termination {
                name: name.to_string(),
                reason: format!("forced kill failed: {source}"),
            };
            error!(error = %err, "process may still be running");
            None
        }
    };

    TerminationReport {
        exit_code: code,
        already_exited: false,
        forced: true,
    }
}

/// Graceful stop request: SIGTERM to the whole process group on Unix.
#[cfg(unix)]
fn request_stop(name: &str, child: &mut Child) -> Result<(), OrchestratorError> {
    signal_group(name, child, nix::sys::signal::Signal::SIGTERM)
}

/// No graceful signal outside Unix; start the kill and let the grace wait
/// reap it.
#[cfg(not(unix))]
fn request_stop(name: &str, child: &mut Child) -> Result<(), OrchestratorError> {
    child
        .start_kill()
        .map_err(|source| OrchestratorError::Termination {
            name: name.to_string(),
            reason: source.to_string(),
        })
}

#[cfg(unix)]
fn signal_group(
    name: &str,
    child: &Child,
    signal: nix::sys::signal::Signal,
) -> Result<(), OrchestratorError> {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    // `id()` is `None` once the child has been reaped.
    let Some(pid) = child.id() else {
        return Ok(());
    };

    match killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(OrchestratorError::Termination {
            name: name.to_string(),
            reason: format!("sending {signal} to process group {pid}: {errno}"),
        }),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::exec::launch;

    #[tokio::test]
    async fn terminates_a_sleeping_child_gracefully() -> crate::errors::Result<()> {
        let mut launched = launch(&RunConfig::new("sleeper", "sleep 30"))?;
        let report = terminate("sleeper", &mut launched.child, Duration::from_secs(5)).await;

        assert!(!report.already_exited);
        assert!(!report.forced);
        assert_eq!(report.exit_code, Some(-15));
        Ok(())
    }

    #[tokio::test]
    async fn escalates_to_kill_when_sigterm_is_ignored() -> crate::errors::Result<()> {
        let cfg = RunConfig::new("stubborn", "trap '' TERM; echo ready; while true; do sleep 1; done");
        let mut launched = launch(&cfg)?;
        // Let the shell install its trap before signalling.
        tokio::time::sleep(Duration::from_millis(300)).await;

        let report = terminate("stubborn", &mut launched.child, Duration::from_millis(300)).await;
        assert!(report.forced);
        assert_eq!(report.exit_code, Some(-9));
        Ok(())
    }

    #[tokio::test]
    async fn second_call_reports_the_same_code() -> crate::errors::Result<()> {
        let mut launched = launch(&RunConfig::new("twice", "sleep 30"))?;
        let first = terminate("twice", &mut launched.child, Duration::from_secs(5)).await;
        let second = terminate("twice", &mut launched.child, Duration::from_secs(5)).await;

        assert_eq!(first.exit_code, second.exit_code);
        assert!(second.already_exited);
        Ok(())
    }

    #[tokio::test]
    async fn exited_child_is_left_alone() -> crate::errors::Result<()> {
        let mut launched = launch(&RunConfig::new("quick", "exit 7"))?;
        launched.child.wait().await?;

        let report = terminate("quick", &mut launched.child, Duration::from_secs(1)).await;
        assert!(report.already_exited);
        assert_eq!(report.exit_code, Some(7));
        Ok(())
    }
}
