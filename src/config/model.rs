// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::config::duration::parse_duration;
use crate::config::run::{DEFAULT_LOG_DIR, RunConfig};
use crate::config::validate::validate_pipeline;
use crate::engine::PollSchedule;
use crate::errors::{OrchestratorError, Result};

/// Pipeline file as read from TOML.
///
/// ```toml
/// [defaults]
/// log_dir = "scripts/logs"
/// timeout = "300s"
/// poll_schedule = ["2s", "5s", "10s"]
///
/// [[step]]
/// name = "build-image"
/// description = "Build the Docker image"
/// cmd = "docker build -t app:latest ."
/// timeout = "10m"
/// ```
///
/// All sections are optional at the serde level; an empty step list is
/// rejected during validation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPipelineFile {
    /// Settings applied to every step unless the step overrides them.
    #[serde(default)]
    pub defaults: RawRunSettings,

    /// Steps in execution order, from `[[step]]` tables.
    #[serde(default, rename = "step")]
    pub steps: Vec<RawStep>,
}

/// Optional run settings, shared by `[defaults]` and each `[[step]]`.
///
/// Durations use the `"300s"` / `"250ms"` / `"5m"` format.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRunSettings {
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub poll_schedule: Option<Vec<String>>,
    #[serde(default)]
    pub success_markers: Option<Vec<String>>,
    #[serde(default)]
    pub shell: Option<String>,
    #[serde(default)]
    pub termination_grace: Option<String>,
    #[serde(default)]
    pub drain_grace: Option<String>,
}

/// `[[step]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStep {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cmd: String,
    #[serde(flatten)]
    pub settings: RawRunSettings,
}

/// A resolved, validated pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Where the pipeline summary record goes.
    pub log_dir: PathBuf,
    pub steps: Vec<StepSpec>,
}

/// One pipeline step: a human description plus its fully resolved run.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSpec {
    pub description: String,
    pub run: RunConfig,
}

impl TryFrom<RawPipelineFile> for PipelineConfig {
    type Error = OrchestratorError;

    fn try_from(raw: RawPipelineFile) -> Result<Self> {
        let log_dir = PathBuf::from(
            raw.defaults
                .log_dir
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
        );

        let mut steps = Vec::with_capacity(raw.steps.len());
        for step in raw.steps {
            let mut run = RunConfig::new(step.name.clone(), step.cmd).with_log_dir(&log_dir);
            apply_settings(&mut run, &raw.defaults, "[defaults]")?;
            apply_settings(&mut run, &step.settings, &format!("step '{}'", step.name))?;

            steps.push(StepSpec {
                description: step.description.unwrap_or_else(|| step.name.clone()),
                run,
            });
        }

        let config = PipelineConfig { log_dir, steps };
        validate_pipeline(&config)?;
        Ok(config)
    }
}

/// Overlay the settings that are present onto `run`.
fn apply_settings(run: &mut RunConfig, settings: &RawRunSettings, origin: &str) -> Result<()> {
    if let Some(ref dir) = settings.log_dir {
        run.log_dir = PathBuf::from(dir);
    }
    if let Some(ref s) = settings.timeout {
        run.timeout = duration_field(s, "timeout", origin)?;
    }
    if let Some(ref list) = settings.poll_schedule {
        let intervals = list
            .iter()
            .map(|s| duration_field(s, "poll_schedule", origin))
            .collect::<Result<Vec<_>>>()?;
        run.poll_schedule = PollSchedule::new(intervals).map_err(|e| {
            OrchestratorError::config(format!("{origin}: invalid poll_schedule: {e}"))
        })?;
    }
    if let Some(ref markers) = settings.success_markers {
        run.success_markers = markers.clone();
    }
    if let Some(ref shell) = settings.shell {
        run.shell = Some(shell.clone());
    }
    if let Some(ref s) = settings.termination_grace {
        run.termination_grace = duration_field(s, "termination_grace", origin)?;
    }
    if let Some(ref s) = settings.drain_grace {
        run.drain_grace = duration_field(s, "drain_grace", origin)?;
    }
    Ok(())
}

fn duration_field(s: &str, field: &str, origin: &str) -> Result<std::time::Duration> {
    parse_duration(s)
        .map_err(|e| OrchestratorError::config(format!("{origin}: invalid {field} '{s}': {e}")))
}
