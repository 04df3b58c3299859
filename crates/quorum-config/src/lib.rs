//! Quorum configuration model.
//!
//! Every validator holds the same declarative [`Config`]: the contracts the
//! quorum administers, the validator set, one code hash per contract kind and
//! a handful of network parameters. Configs arrive as untrusted JSON from
//! files and peers, so construction validates every field and reports all
//! problems at once as [`ValidationIssues`] instead of stopping at the first.
//!
//! Proposals travel between validators as a [`ConfigEnvelope`] carrying the
//! proposed config and the [`Signature`]s collected for it.
//!
//! # Example
//!
//! ```
//! use quorum_config::Config;
//! use serde_json::json;
//!
//! let issues = Config::from_raw(&json!({"network": "testnet"})).unwrap_err();
//! assert!(issues.iter().any(|issue| issue == "nodes: Not defined"));
//! ```

mod asset;
mod config;
pub mod contract;
mod envelope;
mod error;
mod issues;
mod keys;
mod node;
mod raw;
mod signature;
mod wasm;

pub use asset::{Asset, AssetError, AssetKind, MAX_GENERIC_CODE_LEN, NATIVE_CODE};
pub use config::Config;
pub use contract::{
    BallotCategory, ContractBase, ContractConfig, ContractSettings, ContractType, DaoConfig,
    FeeConfig, OracleBeamConfig, OracleConfig, SubscriptionsConfig,
};
pub use envelope::ConfigEnvelope;
pub use error::{Error, Result};
pub use issues::{ValidationIssues, INVALID_OR_NOT_DEFINED, NOT_DEFINED};
pub use keys::{is_valid_contract_id, is_valid_public_key, public_key_bytes};
pub use node::{Node, NodeError};
pub use signature::{verify_signature, Signature};
pub use wasm::{WasmHash, WasmHashError, WasmHashes, WASM_HASH_LEN};
