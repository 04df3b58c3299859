//! Signed config proposals exchanged between validators.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::raw;
use crate::signature::Signature;
use quorum_canonical::Canonical;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// A proposed config together with the votes collected for it.
#[derive(Debug, Clone)]
pub struct ConfigEnvelope {
    pub config: Config,
    pub signatures: Vec<Signature>,
    /// When the proposal should take effect
    pub timestamp: u64,
    /// Submit as soon as approved instead of waiting for `timestamp`
    pub allow_early_submission: bool,
}

impl ConfigEnvelope {
    /// Parse `{"config", "signatures", "timestamp", "allowEarlySubmission"?}`.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        let map = raw
            .as_object()
            .ok_or_else(|| Error::Envelope("rawEnvelope is required".into()))?;
        let config = raw::field(map, "config")
            .ok_or_else(|| Error::Envelope("config is required".into()))?;
        let config = Config::from_raw(config)?;

        let raw_signatures = raw::field(map, "signatures")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Envelope("signatures is required".into()))?;
        let mut signatures: Vec<Signature> = Vec::with_capacity(raw_signatures.len());
        for raw_signature in raw_signatures {
            let signature = Signature::from_raw(raw_signature)?;
            if signatures.iter().any(|s| s.pubkey == signature.pubkey) {
                return Err(Error::Envelope(format!(
                    "signature for {} already exists",
                    signature.pubkey
                )));
            }
            signatures.push(signature);
        }

        let timestamp = raw::field(map, "timestamp")
            .and_then(raw::uint)
            .ok_or_else(|| Error::Envelope("timestamp is not a valid number".into()))?;
        let allow_early_submission = matches!(
            raw::field(map, "allowEarlySubmission"),
            Some(Value::Bool(true))
        );

        Ok(Self {
            config,
            signatures,
            timestamp,
            allow_early_submission,
        })
    }

    /// Same proposal: equal config and timestamp, regardless of votes.
    pub fn is_payload_equal(&self, other: &ConfigEnvelope) -> bool {
        self.config.equals(&other.config, false) && self.timestamp == other.timestamp
    }

    pub fn to_plain_with(&self, as_legacy: bool) -> Value {
        let signatures: Vec<Value> = self.signatures.iter().map(Canonical::to_plain).collect();
        json!({
            "allowEarlySubmission": self.allow_early_submission,
            "config": self.config.to_plain_with(as_legacy),
            "signatures": signatures,
            "timestamp": self.timestamp,
        })
    }

    /// Signers whose vote of the given polarity verifies against the payload.
    fn verified_signers(&self, rejected: bool) -> Vec<&str> {
        self.signatures
            .iter()
            .filter(|signature| signature.rejected == rejected)
            .filter(|signature| {
                let hash = match self.config.signature_payload_hash(
                    &signature.pubkey,
                    signature.nonce,
                    signature.rejected,
                ) {
                    Ok(hash) => hash,
                    Err(e) => {
                        warn!(pubkey = %signature.pubkey, error = %e, "Cannot hash signature payload");
                        return false;
                    }
                };
                let valid = signature.verify(&hash);
                if !valid {
                    warn!(pubkey = %signature.pubkey, nonce = signature.nonce, "Invalid config signature");
                }
                valid
            })
            .map(|signature| signature.pubkey.as_str())
            .collect()
    }

    /// Validators that verifiably approved the proposal.
    pub fn accepted_signers(&self) -> Vec<&str> {
        self.verified_signers(false)
    }

    /// Validators that verifiably voted against the proposal.
    pub fn rejected_signers(&self) -> Vec<&str> {
        self.verified_signers(true)
    }

    /// Every validator retained from `current` into the proposal approved it.
    pub fn is_approved(&self, current: &Config) -> bool {
        let accepted = self.accepted_signers();
        let approved = quorum_consensus::all_required_signatures_present(
            &current.node_pubkeys(),
            &self.config.node_pubkeys(),
            &accepted,
        );
        debug!(
            signers = accepted.len(),
            validators = current.nodes.len(),
            approved,
            "Checked config approval"
        );
        approved
    }
}

impl Canonical for ConfigEnvelope {
    fn to_plain(&self) -> Value {
        self.to_plain_with(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    const SYSTEM: &str = "GCEBYD3K3IYSYLK5EQEK72RVAH2AHZUYSFFG4IOXUS5AOINLMXJRMDRA";

    struct Validator {
        key: SigningKey,
        pubkey: String,
    }

    impl Validator {
        fn new(seed: u8) -> Self {
            let key = SigningKey::from_bytes(&[seed; 32]);
            let pubkey =
                stellar_strkey::ed25519::PublicKey(key.verifying_key().to_bytes()).to_string();
            Self { key, pubkey }
        }

        fn vote(&self, config: &Config, nonce: u64, rejected: bool) -> Value {
            let hash = config
                .signature_payload_hash(&self.pubkey, nonce, rejected)
                .unwrap();
            let signature = self.key.sign(&hex::decode(hash).unwrap());
            json!({
                "pubkey": self.pubkey,
                "signature": hex::encode(signature.to_bytes()),
                "nonce": nonce,
                "rejected": rejected,
            })
        }
    }

    fn raw_config(validators: &[&Validator]) -> Value {
        let mut nodes = serde_json::Map::new();
        for (i, validator) in validators.iter().enumerate() {
            nodes.insert(
                validator.pubkey.clone(),
                json!({
                    "pubkey": validator.pubkey,
                    "url": format!("ws://node{}:3000", i),
                    "domain": format!("node{}.com", i),
                }),
            );
        }
        json!({
            "systemAccount": SYSTEM,
            "network": "testnet",
            "minDate": 0,
            "contracts": {},
            "nodes": nodes,
        })
    }

    #[test]
    fn approved_when_retained_validators_sign() {
        let (a, b, c, d) = (Validator::new(1), Validator::new(2), Validator::new(3), Validator::new(4));
        let current = Config::from_raw(&raw_config(&[&a, &b, &c])).unwrap();
        let proposed = Config::from_raw(&raw_config(&[&a, &b, &d])).unwrap();

        let envelope = ConfigEnvelope::from_raw(&json!({
            "config": raw_config(&[&a, &b, &d]),
            "signatures": [a.vote(&proposed, 1, false), b.vote(&proposed, 2, false)],
            "timestamp": 1000,
        }))
        .unwrap();

        assert_eq!(envelope.accepted_signers().len(), 2);
        assert!(envelope.is_approved(&current));
        assert!(!envelope.allow_early_submission);
    }

    #[test]
    fn rejection_and_bad_signatures_do_not_count() {
        let (a, b) = (Validator::new(1), Validator::new(2));
        let current = Config::from_raw(&raw_config(&[&a, &b])).unwrap();
        let mut forged = b.vote(&current, 1, false);
        forged["nonce"] = json!(2);

        let envelope = ConfigEnvelope::from_raw(&json!({
            "config": raw_config(&[&a, &b]),
            "signatures": [a.vote(&current, 1, true), forged],
            "timestamp": "1000",
            "allowEarlySubmission": true,
        }))
        .unwrap();

        assert!(envelope.accepted_signers().is_empty());
        assert_eq!(envelope.rejected_signers(), vec![a.pubkey.as_str()]);
        assert!(!envelope.is_approved(&current));
        assert!(envelope.allow_early_submission);
    }

    #[test]
    fn duplicate_signer_is_an_error() {
        let a = Validator::new(1);
        let config = Config::from_raw(&raw_config(&[&a])).unwrap();
        let err = ConfigEnvelope::from_raw(&json!({
            "config": raw_config(&[&a]),
            "signatures": [a.vote(&config, 1, false), a.vote(&config, 2, false)],
            "timestamp": 1,
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid envelope: signature for {} already exists", a.pubkey)
        );
    }

    #[test]
    fn payload_equality_ignores_votes() {
        let a = Validator::new(1);
        let config = Config::from_raw(&raw_config(&[&a])).unwrap();
        let unsigned = ConfigEnvelope::from_raw(&json!({
            "config": raw_config(&[&a]),
            "signatures": [],
            "timestamp": 5,
        }))
        .unwrap();
        let signed = ConfigEnvelope::from_raw(&json!({
            "config": raw_config(&[&a]),
            "signatures": [a.vote(&config, 1, false)],
            "timestamp": 5,
        }))
        .unwrap();
        assert!(unsigned.is_payload_equal(&signed));
        assert_ne!(unsigned.to_plain(), signed.to_plain());
        assert_eq!(signed.to_plain()["signatures"][0]["pubkey"], json!(a.pubkey));
    }

    #[test]
    fn missing_parts_are_errors() {
        let err = ConfigEnvelope::from_raw(&json!({"signatures": [], "timestamp": 1})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid envelope: config is required");
        let err = ConfigEnvelope::from_raw(&json!({
            "config": {"network": "x"},
            "signatures": [],
            "timestamp": 1,
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }
}
