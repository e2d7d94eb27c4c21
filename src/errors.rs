// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Launch, stream and termination errors are built at the component that
//! hits them and then downgraded to a run status plus a log entry by the
//! driver. Only persistence and configuration errors travel further up.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::OutputStream;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("failed to launch command for run '{name}': {source}")]
    Launch {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading {stream} of run '{name}': {source}")]
    StreamRead {
        name: String,
        stream: OutputStream,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to terminate process of run '{name}': {reason}")]
    Termination { name: String, reason: String },

    #[error("failed to persist record '{name}' at {path:?}: {source}")]
    Persistence {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrchestratorError {
    pub fn config(msg: impl Into<String>) -> Self {
        OrchestratorError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
