//! Error types for canonical hashing.

use thiserror::Error;

/// Result type for canonical hashing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while hashing canonical data.
#[derive(Debug, Error)]
pub enum Error {
    /// A signature payload was requested without a signer key.
    #[error("pubkey is required")]
    MissingPubkey,

    /// A signature payload was requested with a zero nonce.
    #[error("nonce is required")]
    MissingNonce,

    /// Signature payloads can only be built over JSON objects.
    #[error("signature payload must be an object")]
    NotAnObject,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
