// src/record/mod.rs

//! Durable run and pipeline records.
//!
//! The record file is the contract with callers: pipeline drivers and test
//! harnesses read `<log-dir>/<name>.json` back instead of relying on a return
//! value, which lets the orchestrator run as a standalone subprocess.

pub mod result;
pub mod store;

pub use result::{PipelineSummary, RunResult};
pub use store::{
    SUMMARY_RECORD_NAME, read_result, read_summary, record_path, write_result, write_summary,
};
