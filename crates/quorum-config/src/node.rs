//! Validator nodes.

use crate::keys::is_valid_public_key;
use crate::raw;
use quorum_canonical::Canonical;
use serde_json::{json, Value};
use thiserror::Error;

/// Reasons a node entry is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("Node is undefined")]
    Undefined,

    #[error("pubkey is undefined or invalid")]
    InvalidPubkey,

    #[error("url is undefined or invalid")]
    InvalidUrl,

    #[error("domain is undefined or invalid")]
    InvalidDomain,
}

/// A validator participating in the quorum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Validator signing key
    pub pubkey: String,
    /// Peer endpoint (`host:port`, optionally `ws://` or `wss://`)
    pub url: String,
    /// Operator domain
    pub domain: String,
}

impl Node {
    /// Parse `{"pubkey", "url", "domain"}`.
    pub fn from_raw(raw: &Value) -> Result<Self, NodeError> {
        let map = raw.as_object().ok_or(NodeError::Undefined)?;
        let pubkey = raw::field(map, "pubkey")
            .and_then(raw::text)
            .filter(|key| is_valid_public_key(key))
            .ok_or(NodeError::InvalidPubkey)?;
        let url = raw::field(map, "url")
            .and_then(raw::text)
            .filter(|url| is_valid_url(url))
            .ok_or(NodeError::InvalidUrl)?;
        let domain = raw::field(map, "domain")
            .and_then(raw::text)
            .ok_or(NodeError::InvalidDomain)?;
        Ok(Self {
            pubkey: pubkey.to_string(),
            url: url.to_string(),
            domain: domain.to_string(),
        })
    }
}

/// `^(|ws://|wss://)[\w-.:]+$`
fn is_valid_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("wss://")
        .or_else(|| url.strip_prefix("ws://"))
        .unwrap_or(url);
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

impl Canonical for Node {
    fn to_plain(&self) -> Value {
        json!({
            "domain": self.domain,
            "pubkey": self.pubkey,
            "url": self.url,
        })
    }
}
