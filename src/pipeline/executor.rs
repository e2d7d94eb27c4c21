// src/pipeline/executor.rs

//! Pluggable step executor abstraction.
//!
//! The pipeline runner talks to a `StepExecutor` instead of building
//! orchestrators itself. Production uses [`OrchestratorExecutor`]; tests can
//! provide an implementation that returns canned results without spawning
//! processes.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::config::RunConfig;
use crate::engine::Orchestrator;
use crate::errors::Result;
use crate::record::{self, RunResult};

/// Trait abstracting how a single pipeline step is executed.
pub trait StepExecutor: Send {
    /// Execute one step and hand back its recorded result.
    ///
    /// An `Err` means no usable record exists for the step; the runner halts.
    fn execute(
        &mut self,
        run: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + '_>>;
}

/// Real executor: runs the step through an [`Orchestrator`] and then reads
/// the step's record back from the log directory, the same way an
/// out-of-process caller would.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorExecutor;

impl OrchestratorExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl StepExecutor for OrchestratorExecutor {
    fn execute(
        &mut self,
        run: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + '_>> {
        Box::pin(async move {
            let orchestrator = Orchestrator::new(run)?;
            let returned = orchestrator.run().await?;
            debug!(run = %returned.name, status = %returned.status, "reading step record back");
            record::read_result(&orchestrator.config().log_dir, &returned.name)
        })
    }
}
