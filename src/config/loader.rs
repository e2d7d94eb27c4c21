// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{PipelineConfig, RawPipelineFile};
use crate::errors::Result;

/// Load a pipeline file from a given path and return the raw `RawPipelineFile`.
///
/// This only performs TOML deserialization; it does **not** resolve
/// defaults or validate steps. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPipelineFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawPipelineFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a pipeline file from path, resolve `[defaults]` into every step and
/// validate the result.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let raw = load_from_path(&path)?;
    PipelineConfig::try_from(raw)
}

/// Default pipeline file: `Pipeline.toml` in the current working directory.
pub fn default_pipeline_path() -> PathBuf {
    PathBuf::from("Pipeline.toml")
}
