//! Error types for the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad command line
    #[error("{0}")]
    Usage(String),

    /// File could not be read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input is not JSON
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is not a usable config or envelope
    #[error("{0}")]
    Config(#[from] quorum_config::Error),

    /// The proposal cannot be reconciled
    #[error("{0}")]
    Update(#[from] quorum_updates::Error),

    /// Hashing failed
    #[error("{0}")]
    Hash(#[from] quorum_canonical::Error),
}
