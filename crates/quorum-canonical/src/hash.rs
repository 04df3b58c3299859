//! SHA-256 hashes over canonical JSON.

use crate::canonical::to_canonical_json;
use crate::error::{Error, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Lower-case hex SHA-256 of the canonical JSON of `value`.
pub fn data_hash(value: &Value) -> Result<String> {
    let text = to_canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(text.as_bytes())))
}

/// Hash a signer must sign to approve (or reject) `value`.
///
/// The payload is `"{pubkey}:" + canonical(value + nonce [+ rejected])`. The
/// nonce binds the signature to one voting round for that signer, and the
/// `rejected` flag turns the same payload into a negative vote.
pub fn signature_payload_hash(
    value: &Value,
    pubkey: &str,
    nonce: u64,
    rejected: bool,
) -> Result<String> {
    if pubkey.is_empty() {
        return Err(Error::MissingPubkey);
    }
    if nonce == 0 {
        return Err(Error::MissingNonce);
    }
    let mut payload = value.clone();
    let Value::Object(map) = &mut payload else {
        return Err(Error::NotAnObject);
    };
    map.insert("nonce".to_string(), Value::from(nonce));
    if rejected {
        map.insert("rejected".to_string(), Value::Bool(true));
    }
    let text = to_canonical_json(&payload)?;
    let mut hasher = Sha256::new();
    hasher.update(pubkey.as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
