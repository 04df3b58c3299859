//! Hard validation errors raised while deriving updates.

use crate::update::UpdateKind;
use quorum_config::ValidationIssues;
use thiserror::Error;

/// Result type for update derivation.
pub type Result<T> = std::result::Result<T, Error>;

/// A proposal that cannot be reconciled with the current config.
///
/// Every variant aborts the whole derivation; no partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// One of the inputs failed field-level validation
    #[error("{side} config is not valid: {issues}")]
    InvalidConfig {
        side: &'static str,
        issues: ValidationIssues,
    },

    #[error("Global update can not be combined with contracts update")]
    GlobalWithContracts,

    #[error("Only one global update can be applied at a time")]
    MultipleGlobal,

    #[error("Majority can't be reached with current nodes update")]
    MajorityUnreachable,

    #[error("Wasm can not be removed")]
    WasmRemoved,

    #[error("Only one wasm update can be applied at a time")]
    MultipleWasm,

    #[error("Contract {contract}. {field} can not be modified")]
    ImmutableField {
        contract: String,
        field: &'static str,
    },

    #[error("Contract {contract}. Assets can not be modified or removed")]
    AssetsModified { contract: String },

    #[error("Duplicated key {key} found in {collection}")]
    DuplicateKey { key: String, collection: String },

    #[error("Contract {contract}. Only one update can be applied at a time")]
    MultiplePerContract { contract: String },

    #[error("Multiple blockchain updates are not supported")]
    MultipleBlockchainUpdates,

    #[error("Combined multiple updates are not supported")]
    CombinedUpdates,

    /// An optional on-chain setting was dropped; contracts cannot unset it
    #[error("Contract {contract}. {field} can not be removed")]
    RemovedSetting {
        contract: String,
        field: &'static str,
    },

    /// An update was constructed with an impossible payload
    #[error("Malformed {kind} update: {reason}")]
    MalformedPayload {
        kind: UpdateKind,
        reason: &'static str,
    },
}
