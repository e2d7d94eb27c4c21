// src/pipeline/mod.rs

//! Sequential pipelines of named runs.
//!
//! - [`runner`] walks the selected steps in order, halts on the first
//!   non-success, and writes the pipeline summary record.
//! - [`executor`] provides the `StepExecutor` seam and the production
//!   `OrchestratorExecutor`.

pub mod executor;
pub mod runner;

pub use executor::{OrchestratorExecutor, StepExecutor};
pub use runner::{PipelineOutcome, PipelineRunner, StepRange};
