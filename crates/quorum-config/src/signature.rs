//! Validator votes over a config payload.

use crate::error::{Error, Result};
use crate::keys::{is_valid_public_key, public_key_bytes};
use crate::raw;
use ed25519_dalek::{Verifier, VerifyingKey};
use quorum_canonical::Canonical;
use serde_json::{Map, Value};

/// A detached ed25519 signature by one validator.
///
/// The signed message is the raw bytes of the config's signature payload
/// hash for this signer and nonce. `rejected` turns the vote negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub pubkey: String,
    /// Hex-encoded signature bytes
    pub signature: String,
    pub nonce: u64,
    pub rejected: bool,
}

impl Signature {
    /// Parse `{"pubkey", "signature", "nonce", "rejected"?}`.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        let map = raw
            .as_object()
            .ok_or_else(|| Error::Signature("rawSignature is required".into()))?;
        let pubkey = raw::field(map, "pubkey")
            .and_then(raw::text)
            .ok_or_else(|| Error::Signature("pubkey is required".into()))?;
        if !is_valid_public_key(pubkey) {
            return Err(Error::Signature("pubkey is invalid".into()));
        }
        let signature = raw::field(map, "signature")
            .and_then(raw::text)
            .ok_or_else(|| Error::Signature("signature is required".into()))?;
        let nonce = raw::field(map, "nonce")
            .ok_or_else(|| Error::Signature("nonce is required".into()))?;
        let nonce = raw::positive(nonce).ok_or_else(|| Error::Signature("nonce is invalid".into()))?;
        let rejected = match raw::field(map, "rejected") {
            None => false,
            Some(Value::Bool(rejected)) => *rejected,
            Some(_) => return Err(Error::Signature("rejected is invalid".into())),
        };
        Ok(Self {
            pubkey: pubkey.to_string(),
            signature: signature.to_string(),
            nonce,
            rejected,
        })
    }

    /// Check this signature over a hex-encoded payload hash.
    pub fn verify(&self, hash: &str) -> bool {
        verify_signature(&self.pubkey, &self.signature, hash)
    }
}

impl Canonical for Signature {
    fn to_plain(&self) -> Value {
        let mut out = Map::new();
        out.insert("nonce".into(), Value::from(self.nonce));
        out.insert("pubkey".into(), Value::from(self.pubkey.as_str()));
        out.insert("signature".into(), Value::from(self.signature.as_str()));
        if self.rejected {
            out.insert("rejected".into(), Value::Bool(true));
        }
        Value::Object(out)
    }
}

/// Verify a hex signature by an account strkey over a hex hash.
///
/// Malformed keys, signatures or hashes simply fail verification.
pub fn verify_signature(pubkey: &str, signature: &str, hash: &str) -> bool {
    let Some(key) = public_key_bytes(pubkey) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key) else {
        return false;
    };
    let (Ok(signature), Ok(message)) = (hex::decode(signature), hex::decode(hash)) else {
        return false;
    };
    let Ok(signature) = ed25519_dalek::Signature::from_slice(&signature) else {
        return false;
    };
    key.verify(&message, &signature).is_ok()
}
