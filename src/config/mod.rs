// src/config/mod.rs

//! Configuration for orchestrated runs and pipelines.
//!
//! Responsibilities:
//! - Define the explicit per-run configuration (`run.rs`).
//! - Define the TOML-backed pipeline model (`model.rs`).
//! - Load a pipeline file from disk (`loader.rs`).
//! - Validate names, timeouts and markers (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod run;
pub mod validate;

pub use duration::{format_duration, parse_duration};
pub use loader::{default_pipeline_path, load_and_validate, load_from_path};
pub use model::{PipelineConfig, RawPipelineFile, RawRunSettings, RawStep, StepSpec};
pub use run::{RunConfig, default_success_markers};
pub use validate::{validate_pipeline, validate_run_config, validate_run_name};
