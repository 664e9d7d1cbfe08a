// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShexecError {
    /// Every failed precondition check, joined into one message.
    #[error("{0}")]
    Validation(String),

    #[error("failed to spawn '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The watchdog declared the deadline exceeded. Termination of the child
    /// has been initiated, not necessarily completed.
    #[error("execution expired after {seconds}s")]
    Timeout { seconds: f64 },

    #[error("failed to write captured output to {}: {source}", path.display())]
    OutputPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShexecError>;
