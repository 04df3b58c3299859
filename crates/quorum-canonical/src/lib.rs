//! Canonical serialization for quorum configuration data.
//!
//! Every node in the quorum computes configuration hashes independently and
//! then cross-verifies them before co-signing. That only works if logically
//! identical data produces byte-identical bytes on every node, regardless of
//! the order in which a map was built or the host's map iteration order.
//!
//! # Rules
//!
//! - Object keys are sorted recursively in root-locale collation order, so
//!   `_` sorts before `-`, digits before letters, and case only breaks ties
//! - Array order is preserved (asset append order is meaningful)
//! - Scalars pass through untouched
//! - Arbitrary-precision amounts are rendered as decimal strings
//!
//! # Example
//!
//! ```
//! use quorum_canonical::{data_hash, to_canonical_json};
//! use serde_json::json;
//!
//! let a = json!({"z": 1, "a": {"y": 2, "b": 3}});
//! assert_eq!(to_canonical_json(&a).unwrap(), r#"{"a":{"b":3,"y":2},"z":1}"#);
//! assert_eq!(data_hash(&a).unwrap().len(), 64);
//! ```

mod canonical;
mod error;
mod hash;

pub use canonical::{amount, key_order, plain_map, to_canonical_json, Canonical};
pub use error::{Error, Result};
pub use hash::{data_hash, signature_payload_hash};
