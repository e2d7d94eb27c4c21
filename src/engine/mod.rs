// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the escalating poll schedule
//! - the completion poller (exit / success marker / timeout)
//! - the per-run state machine
//! - the driver that launches, waits, terminates and records a run

pub mod driver;
pub mod poller;
pub mod schedule;
pub mod state;

pub use driver::Orchestrator;
pub use poller::{PollOutcome, Poller};
pub use schedule::PollSchedule;
pub use state::{RunState, RunStatus};
