// src/config/validate.rs

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::PipelineConfig;
use crate::config::run::RunConfig;
use crate::errors::{OrchestratorError, Result};
use crate::record::SUMMARY_RECORD_NAME;

/// Run names become file stems under the log directory.
static RUN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("run name pattern is valid")
});

/// Semantic checks for a single run.
///
/// This checks:
/// - the name is filesystem-safe and not the reserved summary name
/// - the command is not blank (it is otherwise opaque)
/// - the timeout is positive
/// - no success marker is empty (an empty marker matches any output)
///
/// The poll schedule is already guaranteed non-empty and positive by
/// `PollSchedule::new`.
pub fn validate_run_config(cfg: &RunConfig) -> Result<()> {
    validate_run_name(&cfg.name)?;

    if cfg.command.trim().is_empty() {
        return Err(OrchestratorError::config(format!(
            "run '{}' has an empty command",
            cfg.name
        )));
    }

    if cfg.timeout.is_zero() {
        return Err(OrchestratorError::config(format!(
            "run '{}' must have a timeout greater than zero",
            cfg.name
        )));
    }

    if cfg.success_markers.iter().any(|m| m.is_empty()) {
        return Err(OrchestratorError::config(format!(
            "run '{}' has an empty success marker",
            cfg.name
        )));
    }

    if let Some(ref shell) = cfg.shell {
        if shell.trim().is_empty() {
            return Err(OrchestratorError::config(format!(
                "run '{}' has an empty shell",
                cfg.name
            )));
        }
    }

    Ok(())
}

pub fn validate_run_name(name: &str) -> Result<()> {
    if !RUN_NAME.is_match(name) {
        return Err(OrchestratorError::config(format!(
            "invalid run name '{name}': use letters, digits, '.', '_' or '-', starting with a letter or digit"
        )));
    }
    if name == SUMMARY_RECORD_NAME {
        return Err(OrchestratorError::config(format!(
            "run name '{name}' is reserved for the pipeline summary"
        )));
    }
    Ok(())
}

/// Checks for a resolved pipeline: at least one step, unique names, and
/// every step valid on its own.
pub fn validate_pipeline(cfg: &PipelineConfig) -> Result<()> {
    if cfg.steps.is_empty() {
        return Err(OrchestratorError::config(
            "pipeline must contain at least one [[step]] section",
        ));
    }

    let mut seen = HashSet::new();
    for step in &cfg.steps {
        validate_run_config(&step.run)?;
        if !seen.insert(step.run.name.as_str()) {
            return Err(OrchestratorError::config(format!(
                "duplicate step name '{}'",
                step.run.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn accepts_typical_names() {
        for name in ["ledger-step-1", "deploy_api.20240101", "A"] {
            assert!(validate_run_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_unsafe_names() {
        for name in ["", "..", "../etc", "a/b", "-flag", "with space", "pipeline_summary"] {
            assert!(validate_run_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn rejects_zero_timeout_and_empty_marker() {
        let cfg = RunConfig::new("x", "true").with_timeout(Duration::ZERO);
        assert!(validate_run_config(&cfg).is_err());

        let cfg = RunConfig::new("x", "true").with_success_markers(["DONE", ""]);
        assert!(validate_run_config(&cfg).is_err());
    }

    #[test]
    fn empty_marker_set_is_allowed() {
        let cfg = RunConfig::new("x", "true").with_success_markers(Vec::<String>::new());
        assert!(validate_run_config(&cfg).is_ok());
    }

    #[test]
    fn rejects_blank_command() {
        assert!(validate_run_config(&RunConfig::new("x", "   ")).is_err());
    }
}
