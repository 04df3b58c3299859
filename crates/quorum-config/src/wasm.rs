//! Contract code hashes, one per contract kind.

use crate::contract::ContractType;
use crate::issues::ValidationIssues;
use quorum_canonical::Canonical;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Length of a hex-encoded code hash.
pub const WASM_HASH_LEN: usize = 64;

/// Reasons a code hash entry is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WasmHashError {
    #[error("Wasm hash item is not defined")]
    Undefined,

    #[error("Wasm hash is not valid: {0}")]
    InvalidHash(String),

    #[error("Wasm contract type is not valid: {0}")]
    InvalidType(String),

    #[error("Wasm contract type '{kind}' does not match key '{key}'")]
    KeyMismatch { key: String, kind: ContractType },
}

/// Deployed program hash for one contract kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasmHash {
    pub hash: String,
    pub kind: ContractType,
}

impl WasmHash {
    pub fn new(hash: impl Into<String>, kind: ContractType) -> Result<Self, WasmHashError> {
        let hash = hash.into();
        if hash.len() != WASM_HASH_LEN || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(WasmHashError::InvalidHash(hash));
        }
        Ok(Self { hash, kind })
    }

    /// Parse `{"hash", "type"}`.
    pub fn from_raw(raw: &Value) -> Result<Self, WasmHashError> {
        let map = raw.as_object().ok_or(WasmHashError::Undefined)?;
        let hash = map
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| WasmHashError::InvalidHash(String::new()))?;
        let kind = match map.get("type") {
            Some(Value::String(kind)) => kind
                .parse()
                .map_err(|_| WasmHashError::InvalidType(kind.clone()))?,
            other => {
                let text = other.map(Value::to_string).unwrap_or_default();
                return Err(WasmHashError::InvalidType(text));
            }
        };
        Self::new(hash, kind)
    }
}

impl Canonical for WasmHash {
    fn to_plain(&self) -> Value {
        json!({
            "hash": self.hash,
            "type": self.kind.as_str(),
        })
    }
}

/// The `wasmHash` section of a config.
///
/// Early configs carried a single bare oracle hash string; that shape is
/// normalized to `{oracle: {hash, type}}` and tagged legacy so it can be
/// written back out unchanged.
#[derive(Debug, Clone, Default)]
pub struct WasmHashes {
    entries: BTreeMap<ContractType, WasmHash>,
    legacy: bool,
}

impl PartialEq for WasmHashes {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for WasmHashes {}

impl WasmHashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the section, recording issues under `wasmHash`.
    pub(crate) fn parse(raw: Option<&Value>, issues: &mut ValidationIssues) -> Option<Self> {
        let mut hashes = Self::new();
        match raw {
            None => Some(hashes),
            Some(Value::String(hash)) if hash.is_empty() => Some(hashes),
            Some(Value::String(hash)) => {
                let entry = issues.check("wasmHash", WasmHash::new(hash.as_str(), ContractType::Oracle))?;
                hashes.entries.insert(ContractType::Oracle, entry);
                hashes.legacy = true;
                Some(hashes)
            }
            Some(Value::Object(map)) => {
                let mut valid = true;
                for (key, item) in map {
                    let path = format!("wasmHash.{}", key);
                    let entry = WasmHash::from_raw(item).and_then(|entry| {
                        if entry.kind.as_str() == key {
                            Ok(entry)
                        } else {
                            Err(WasmHashError::KeyMismatch {
                                key: key.clone(),
                                kind: entry.kind,
                            })
                        }
                    });
                    match issues.check(path, entry) {
                        Some(entry) => {
                            hashes.entries.insert(entry.kind, entry);
                        }
                        None => valid = false,
                    }
                }
                valid.then_some(hashes)
            }
            Some(other) => {
                issues.add("wasmHash", WasmHashError::InvalidHash(other.to_string()));
                None
            }
        }
    }

    pub fn get(&self, kind: ContractType) -> Option<&WasmHash> {
        self.entries.get(&kind)
    }

    /// Set the hash for its contract kind, replacing any previous one.
    pub fn insert(&mut self, hash: WasmHash) -> Option<WasmHash> {
        self.entries.insert(hash.kind, hash)
    }

    pub fn entries(&self) -> &BTreeMap<ContractType, WasmHash> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Supplied as a bare hash string and still holding only the oracle
    /// hash, so the bare shape can be written back without losing entries.
    pub fn is_legacy(&self) -> bool {
        self.legacy_oracle().is_some()
    }

    fn legacy_oracle(&self) -> Option<&WasmHash> {
        if !self.legacy || self.entries.len() != 1 {
            return None;
        }
        self.entries.get(&ContractType::Oracle)
    }

    /// Plain projection; `as_legacy` writes a legacy section as the bare
    /// oracle hash.
    pub fn to_plain_with(&self, as_legacy: bool) -> Value {
        if as_legacy {
            if let Some(oracle) = self.legacy_oracle() {
                return Value::from(oracle.hash.as_str());
            }
        }
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(kind, hash)| (kind.as_str().to_string(), hash.to_plain()))
            .collect();
        Value::Object(map)
    }
}

impl Canonical for WasmHashes {
    fn to_plain(&self) -> Value {
        self.to_plain_with(true)
    }
}
