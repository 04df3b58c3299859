//! The root configuration aggregate.

use crate::asset::Asset;
use crate::contract::{ContractConfig, ContractSettings};
use crate::error::Result;
use crate::issues::{ValidationIssues, INVALID_OR_NOT_DEFINED, NOT_DEFINED};
use crate::keys::is_valid_public_key;
use crate::node::Node;
use crate::raw;
use crate::wasm::WasmHashes;
use quorum_canonical::{plain_map, Canonical};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Network-wide configuration shared by every validator.
///
/// A `Config` only exists in a valid state: [`Config::from_raw`] either
/// returns one or the full list of field-level issues. Fields are public so
/// operator tooling can clone a config and edit it into a proposal; run
/// [`Config::validate`] on such an edited copy before diffing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Contracts keyed by contract id
    pub contracts: BTreeMap<String, ContractConfig>,
    /// Validators keyed by public key
    pub nodes: BTreeMap<String, Node>,
    pub wasm_hash: WasmHashes,
    /// Earliest timestamp a proposal may take effect
    pub min_date: u64,
    /// Account that pays for network transactions
    pub system_account: String,
    /// Ledger network passphrase
    pub network: String,
    pub decimals: Option<u32>,
    /// Default base asset per data source
    pub base_assets: Option<BTreeMap<String, Asset>>,
}

impl Config {
    /// Build from an untrusted raw document, collecting every issue.
    pub fn from_raw(raw: &Value) -> std::result::Result<Self, ValidationIssues> {
        let mut issues = ValidationIssues::new();
        let Some(map) = raw.as_object() else {
            issues.add("config", NOT_DEFINED);
            return Err(issues);
        };
        match Self::parse(map, &mut issues) {
            Some(config) => issues.finish(config),
            None => Err(issues),
        }
    }

    fn parse(map: &Map<String, Value>, issues: &mut ValidationIssues) -> Option<Self> {
        let contracts = parse_contracts(raw::field(map, "contracts"), issues);
        let nodes = parse_nodes(raw::field(map, "nodes"), issues);
        let wasm_hash = WasmHashes::parse(raw::field(map, "wasmHash"), issues);

        let min_date = match raw::field(map, "minDate") {
            None => issues.require("minDate", None, NOT_DEFINED),
            Some(value) => issues.require("minDate", raw::uint(value), INVALID_OR_NOT_DEFINED),
        };
        let system_account = issues.require(
            "systemAccount",
            raw::field(map, "systemAccount")
                .and_then(raw::text)
                .filter(|key| is_valid_public_key(key)),
            INVALID_OR_NOT_DEFINED,
        );
        let network = issues.require(
            "network",
            raw::field(map, "network").and_then(raw::text),
            NOT_DEFINED,
        );
        // zero is treated as absent
        let decimals = match raw::field(map, "decimals").filter(|value| raw::uint(value) != Some(0)) {
            None => Some(None),
            Some(value) => issues
                .require(
                    "decimals",
                    raw::uint(value).and_then(|v| u32::try_from(v).ok()),
                    "Decimals should be a number",
                )
                .map(Some),
        };
        let base_assets = match raw::field(map, "baseAssets") {
            None => Some(None),
            Some(value) => parse_base_assets(value, issues).map(Some),
        };

        Some(Self {
            contracts: contracts?,
            nodes: nodes?,
            wasm_hash: wasm_hash?,
            min_date: min_date?,
            system_account: system_account?.to_string(),
            network: network?.to_string(),
            decimals: decimals?,
            base_assets: base_assets?,
        })
    }

    /// Parse JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(text)?;
        Ok(Self::from_raw(&raw)?)
    }

    /// Re-check every rule against the current field values.
    pub fn validate(&self) -> std::result::Result<(), ValidationIssues> {
        // the projection keeps map keys, so key mismatches resurface here
        Self::from_raw(&self.to_plain_with(false)).map(|_| ())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Current validation issues, defined only when invalid.
    pub fn issues(&self) -> Option<Vec<String>> {
        self.validate()
            .err()
            .map(|issues| issues.iter().map(str::to_string).collect())
    }

    /// True when any section was supplied in a legacy shape.
    pub fn is_legacy(&self) -> bool {
        self.wasm_hash.is_legacy() || self.contracts.values().any(ContractConfig::is_legacy)
    }

    /// Deep equality, optionally ignoring `min_date`.
    pub fn equals(&self, other: &Config, ignore_min_date: bool) -> bool {
        self.contracts == other.contracts
            && self.nodes == other.nodes
            && self.wasm_hash == other.wasm_hash
            && (ignore_min_date || self.min_date == other.min_date)
            && self.system_account == other.system_account
            && self.network == other.network
            && self.decimals == other.decimals
            && self.base_assets == other.base_assets
    }

    /// Validator public keys in key order.
    pub fn node_pubkeys(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    /// Plain projection; `as_legacy` keeps legacy sections in their old shape.
    pub fn to_plain_with(&self, as_legacy: bool) -> Value {
        let contracts: Map<String, Value> = self
            .contracts
            .iter()
            .map(|(id, contract)| (id.clone(), contract.to_plain_with(as_legacy)))
            .collect();
        let mut out = Map::new();
        out.insert("contracts".into(), Value::Object(contracts));
        out.insert("nodes".into(), plain_map(&self.nodes));
        if !self.wasm_hash.is_empty() {
            out.insert("wasmHash".into(), self.wasm_hash.to_plain_with(as_legacy));
        }
        out.insert("minDate".into(), Value::from(self.min_date));
        out.insert("systemAccount".into(), Value::from(self.system_account.as_str()));
        out.insert("network".into(), Value::from(self.network.as_str()));
        if let Some(decimals) = self.decimals {
            out.insert("decimals".into(), Value::from(decimals));
        }
        if let Some(base_assets) = &self.base_assets {
            out.insert("baseAssets".into(), plain_map(base_assets));
        }
        Value::Object(out)
    }

    /// SHA-256 of the canonical projection.
    pub fn hash(&self) -> Result<String> {
        Ok(quorum_canonical::data_hash(&self.to_plain())?)
    }

    /// Hash a validator signs to vote on this config.
    pub fn signature_payload_hash(&self, pubkey: &str, nonce: u64, rejected: bool) -> Result<String> {
        Ok(quorum_canonical::signature_payload_hash(
            &self.to_plain(),
            pubkey,
            nonce,
            rejected,
        )?)
    }
}

impl Canonical for Config {
    fn to_plain(&self) -> Value {
        self.to_plain_with(true)
    }
}

fn parse_contracts(
    raw: Option<&Value>,
    issues: &mut ValidationIssues,
) -> Option<BTreeMap<String, ContractConfig>> {
    let Some(entries) = raw.and_then(Value::as_object) else {
        issues.add("contracts", NOT_DEFINED);
        return None;
    };
    let mut contracts = BTreeMap::new();
    let mut valid = true;
    for (id, entry) in entries {
        let path = format!("contracts.{}", id);
        if entry.is_null() {
            issues.add(path, NOT_DEFINED);
            valid = false;
            continue;
        }
        match ContractConfig::from_raw(entry) {
            Ok(contract) if contract.contract_id() != id => {
                issues.add(
                    path,
                    format!("contractId '{}' does not match key '{}'", contract.contract_id(), id),
                );
                valid = false;
            }
            Ok(contract) => {
                contracts.insert(id.clone(), contract);
            }
            Err(nested) => {
                issues.extend_scoped(path, nested);
                valid = false;
            }
        }
    }
    valid.then_some(contracts)
}

fn parse_nodes(raw: Option<&Value>, issues: &mut ValidationIssues) -> Option<BTreeMap<String, Node>> {
    let Some(entries) = raw.and_then(Value::as_object) else {
        issues.add("nodes", NOT_DEFINED);
        return None;
    };
    let mut nodes = BTreeMap::new();
    let mut valid = true;
    for (pubkey, entry) in entries {
        let path = format!("nodes.{}", pubkey);
        match Node::from_raw(entry) {
            Ok(node) if node.pubkey != *pubkey => {
                issues.add(
                    path,
                    format!("pubkey '{}' does not match key '{}'", node.pubkey, pubkey),
                );
                valid = false;
            }
            Ok(node) => {
                nodes.insert(pubkey.clone(), node);
            }
            Err(err) => {
                issues.add(path, err);
                valid = false;
            }
        }
    }
    valid.then_some(nodes)
}

fn parse_base_assets(
    raw: &Value,
    issues: &mut ValidationIssues,
) -> Option<BTreeMap<String, Asset>> {
    let Some(entries) = raw.as_object() else {
        issues.add("baseAssets", INVALID_OR_NOT_DEFINED);
        return None;
    };
    let mut assets = BTreeMap::new();
    let mut valid = true;
    for (source, entry) in entries {
        // keys are hashed in collation order, which is only pinned for ASCII
        if source.is_empty() || !source.chars().all(|c| c.is_ascii_graphic()) {
            issues.add(format!("baseAssets.{}", source), "Invalid data source name");
            valid = false;
            continue;
        }
        match issues.check(format!("baseAssets.{}", source), Asset::from_raw(entry)) {
            Some(asset) => {
                assets.insert(source.clone(), asset);
            }
            None => valid = false,
        }
    }
    valid.then_some(assets)
}
