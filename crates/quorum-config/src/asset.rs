//! Price-feed assets.

use crate::keys::{is_valid_contract_id, is_valid_public_key};
use crate::raw;
use quorum_canonical::Canonical;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Native ledger asset symbol.
pub const NATIVE_CODE: &str = "XLM";

/// Maximum length of a generic asset code.
pub const MAX_GENERIC_CODE_LEN: usize = 32;

/// Where an asset lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    /// Ledger-native asset (classic pair, native symbol or contract)
    Stellar = 1,
    /// Off-ledger symbol such as a fiat or crypto ticker
    Generic = 2,
}

impl AssetKind {
    /// Numeric tag used in raw documents.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parse the numeric tag.
    pub fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            1 => Some(Self::Stellar),
            2 => Some(Self::Generic),
            _ => None,
        }
    }
}

/// Reasons an asset is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("Asset type and code must be defined")]
    Undefined,

    #[error("Asset type is invalid: {0}")]
    InvalidType(String),

    #[error("Asset code and issuer must be defined")]
    IncompletePair,

    #[error("Asset issuer must be a valid ed25519 public key")]
    InvalidIssuer,

    #[error("Asset code {0} is invalid")]
    InvalidCode(String),

    #[error("Asset code must be {MAX_GENERIC_CODE_LEN} characters or less")]
    CodeTooLong,
}

/// An asset quoted by an oracle.
///
/// For ledger-native assets `code` is `CODE:ISSUER`, [`NATIVE_CODE`], or a
/// contract id. Equality is structural over `(kind, code)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    kind: AssetKind,
    code: String,
}

impl Asset {
    /// Create a validated asset.
    pub fn new(kind: AssetKind, code: impl Into<String>) -> Result<Self, AssetError> {
        let code = code.into();
        if code.is_empty() {
            return Err(AssetError::Undefined);
        }
        match kind {
            AssetKind::Stellar => validate_stellar_code(&code)?,
            AssetKind::Generic => {
                if code.chars().count() > MAX_GENERIC_CODE_LEN {
                    return Err(AssetError::CodeTooLong);
                }
            }
        }
        Ok(Self { kind, code })
    }

    /// Parse `{"type": n, "code": "…"}`.
    pub fn from_raw(raw: &Value) -> Result<Self, AssetError> {
        let map = raw.as_object().ok_or(AssetError::Undefined)?;
        let kind = raw::field(map, "type").ok_or(AssetError::Undefined)?;
        let code = raw::field(map, "code")
            .and_then(raw::text)
            .ok_or(AssetError::Undefined)?;
        let kind = raw::uint(kind)
            .and_then(AssetKind::from_tag)
            .ok_or_else(|| AssetError::InvalidType(kind.to_string()))?;
        Self::new(kind, code)
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// True for the native ledger asset.
    pub fn is_native(&self) -> bool {
        self.kind == AssetKind::Stellar && self.code == NATIVE_CODE
    }

    /// `(code, issuer)` for classic ledger assets.
    pub fn classic_pair(&self) -> Option<(&str, &str)> {
        if self.kind != AssetKind::Stellar {
            return None;
        }
        self.code.split_once(':')
    }
}

fn validate_stellar_code(code: &str) -> Result<(), AssetError> {
    if let Some((asset_code, issuer)) = code.split_once(':') {
        if asset_code.is_empty() || issuer.is_empty() {
            return Err(AssetError::IncompletePair);
        }
        if asset_code.len() > 12 || !asset_code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AssetError::InvalidCode(code.to_string()));
        }
        if !is_valid_public_key(issuer) {
            return Err(AssetError::InvalidIssuer);
        }
        return Ok(());
    }
    if code == NATIVE_CODE || is_valid_contract_id(code) {
        Ok(())
    } else {
        Err(AssetError::InvalidCode(code.to_string()))
    }
}

impl Canonical for Asset {
    fn to_plain(&self) -> Value {
        json!({
            "code": self.code,
            "type": self.kind.tag(),
        })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.tag(), self.code)
    }
}
