// src/record/store.rs

//! JSON record files under the log directory.
//!
//! Records are written to a temporary sibling and renamed into place, so a
//! reader polling `<name>.json` never sees a half-written file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::errors::{OrchestratorError, Result};
use crate::record::{PipelineSummary, RunResult};

/// File stem of the pipeline summary record.
pub const SUMMARY_RECORD_NAME: &str = "pipeline_summary";

/// Deterministic location of the record for `name`.
pub fn record_path(log_dir: &Path, name: &str) -> PathBuf {
    log_dir.join(format!("{name}.json"))
}

/// Persist a run result, replacing any earlier record with the same name.
pub fn write_result(log_dir: &Path, result: &RunResult) -> Result<PathBuf> {
    write_record(log_dir, &result.name, result)
}

pub fn read_result(log_dir: &Path, name: &str) -> Result<RunResult> {
    read_record(log_dir, name)
}

pub fn write_summary(log_dir: &Path, summary: &PipelineSummary) -> Result<PathBuf> {
    write_record(log_dir, SUMMARY_RECORD_NAME, summary)
}

pub fn read_summary(log_dir: &Path) -> Result<PipelineSummary> {
    read_record(log_dir, SUMMARY_RECORD_NAME)
}

fn write_record<T: Serialize>(log_dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = record_path(log_dir, name);
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let persist = |source| OrchestratorError::Persistence {
        name: name.to_string(),
        path: path.clone(),
        source,
    };

    fs::create_dir_all(log_dir).map_err(persist)?;
    let tmp = log_dir.join(format!(".{name}.json.tmp"));
    fs::write(&tmp, json).map_err(persist)?;
    fs::rename(&tmp, &path).map_err(persist)?;

    info!(record = %name, path = ?path, "record written");
    Ok(path)
}

fn read_record<T: DeserializeOwned>(log_dir: &Path, name: &str) -> Result<T> {
    let path = record_path(log_dir, name);
    debug!(record = %name, path = ?path, "reading record");
    let contents = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&contents)?)
}
