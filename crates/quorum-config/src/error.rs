//! Error types for configuration parsing.

use crate::issues::ValidationIssues;
use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration data.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw text could not be parsed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration failed field-level validation
    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationIssues),

    /// Envelope structure is unusable
    #[error("Invalid envelope: {0}")]
    Envelope(String),

    /// Signature material is malformed
    #[error("Invalid signature: {0}")]
    Signature(String),

    /// Canonical hashing failed
    #[error("Hashing error: {0}")]
    Hash(#[from] quorum_canonical::Error),
}
