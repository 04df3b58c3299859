//! Contract configurations.
//!
//! Four contract kinds share a common header (admin, contract id, fee) and
//! differ in their settings. The kind is a closed sum type so that the update
//! engine matches every kind exhaustively.
//!
//! # Legacy shape
//!
//! Early configs keyed oracles by `oracleId` and carried no `type`. Such
//! entries are normalized to Oracle contracts before validation and tagged
//! legacy, which only affects how they are written back out.

mod dao;
mod oracle;
mod subscriptions;

pub use dao::{BallotCategory, DaoConfig};
pub use oracle::{FeeConfig, OracleBeamConfig, OracleConfig, INVOCATION_COSTS_LEN, TIMEFRAME_UNIT_MS};
pub use subscriptions::{SubscriptionsConfig, ALL_DATA_SOURCES};

use crate::issues::{ValidationIssues, INVALID_OR_NOT_DEFINED, NOT_DEFINED};
use crate::keys::{is_valid_contract_id, is_valid_public_key};
use crate::raw;
use quorum_canonical::Canonical;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Contract role in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Oracle,
    OracleBeam,
    Subscriptions,
    Dao,
}

impl ContractType {
    pub const ALL: [ContractType; 4] = [
        ContractType::Oracle,
        ContractType::OracleBeam,
        ContractType::Subscriptions,
        ContractType::Dao,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ContractType::Oracle => "oracle",
            ContractType::OracleBeam => "oracle_beam",
            ContractType::Subscriptions => "subscriptions",
            ContractType::Dao => "dao",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown contract type: {}", s))
    }
}

/// Fields every contract kind carries.
///
/// `contract_id`, `admin` and the kind are immutable once deployed; that is
/// enforced when two configurations are compared, not here.
#[derive(Debug, Clone)]
pub struct ContractBase {
    /// Account allowed to invoke privileged contract functions
    pub admin: String,
    /// Contract strkey
    pub contract_id: String,
    /// Operator fee
    pub fee: u64,
    legacy: bool,
}

impl PartialEq for ContractBase {
    fn eq(&self, other: &Self) -> bool {
        self.admin == other.admin && self.contract_id == other.contract_id && self.fee == other.fee
    }
}

impl Eq for ContractBase {}

impl ContractBase {
    pub fn new(admin: impl Into<String>, contract_id: impl Into<String>, fee: u64) -> Self {
        Self {
            admin: admin.into(),
            contract_id: contract_id.into(),
            fee,
            legacy: false,
        }
    }

    fn parse(raw: &Map<String, Value>, legacy: bool, issues: &mut ValidationIssues) -> Option<Self> {
        let admin = issues.require(
            "admin",
            raw::field(raw, "admin")
                .and_then(raw::text)
                .filter(|key| is_valid_public_key(key)),
            INVALID_OR_NOT_DEFINED,
        );
        let contract_id = issues.require(
            "contractId",
            raw::field(raw, "contractId")
                .and_then(raw::text)
                .filter(|id| is_valid_contract_id(id)),
            INVALID_OR_NOT_DEFINED,
        );
        let fee = issues.require(
            "fee",
            raw::field(raw, "fee").and_then(raw::positive),
            INVALID_OR_NOT_DEFINED,
        );
        Some(Self {
            admin: admin?.to_string(),
            contract_id: contract_id?.to_string(),
            fee: fee?,
            legacy,
        })
    }

    /// Written in the legacy `oracleId` shape.
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    fn write_plain(&self, kind: ContractType, as_legacy: bool, out: &mut Map<String, Value>) {
        out.insert("admin".into(), Value::from(self.admin.as_str()));
        out.insert("fee".into(), Value::from(self.fee));
        if self.legacy && as_legacy {
            out.insert("oracleId".into(), Value::from(self.contract_id.as_str()));
        } else {
            out.insert("contractId".into(), Value::from(self.contract_id.as_str()));
            out.insert("type".into(), Value::from(kind.as_str()));
        }
    }
}

/// Shared accessors over every contract kind.
pub trait ContractSettings {
    fn base(&self) -> &ContractBase;

    fn contract_type(&self) -> ContractType;

    fn contract_id(&self) -> &str {
        &self.base().contract_id
    }

    fn admin(&self) -> &str {
        &self.base().admin
    }

    fn fee(&self) -> u64 {
        self.base().fee
    }
}

/// A contract configuration of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractConfig {
    Oracle(OracleConfig),
    OracleBeam(OracleBeamConfig),
    Subscriptions(SubscriptionsConfig),
    Dao(DaoConfig),
}

impl ContractConfig {
    /// Parse a raw contract entry, normalizing the legacy shape first.
    pub fn from_raw(raw: &Value) -> Result<Self, ValidationIssues> {
        let mut issues = ValidationIssues::new();
        let Some(map) = raw.as_object() else {
            issues.add("settings", NOT_DEFINED);
            return Err(issues);
        };
        let (map, legacy) = match normalize_legacy(map) {
            Ok(normalized) => normalized,
            Err(reason) => {
                issues.add("contractId", reason);
                return Err(issues);
            }
        };
        let kind = match raw::field(&map, "type").and_then(raw::text) {
            Some(kind) => issues.check("type", kind.parse::<ContractType>()),
            None => issues.require("type", None, INVALID_OR_NOT_DEFINED),
        };
        let Some(kind) = kind else {
            return Err(issues);
        };
        let base = ContractBase::parse(&map, legacy, &mut issues);
        let config = match kind {
            ContractType::Oracle => OracleConfig::parse(&map, base, &mut issues).map(Self::Oracle),
            ContractType::OracleBeam => {
                OracleBeamConfig::parse(&map, base, &mut issues).map(Self::OracleBeam)
            }
            ContractType::Subscriptions => {
                SubscriptionsConfig::parse(&map, base, &mut issues).map(Self::Subscriptions)
            }
            ContractType::Dao => DaoConfig::parse(&map, base, &mut issues).map(Self::Dao),
        };
        match config {
            Some(config) => issues.finish(config),
            None => Err(issues),
        }
    }

    /// Written in the legacy `oracleId` shape.
    pub fn is_legacy(&self) -> bool {
        self.base().is_legacy()
    }

    /// Plain projection; `as_legacy` keeps legacy entries in their old shape.
    pub fn to_plain_with(&self, as_legacy: bool) -> Value {
        let mut out = Map::new();
        self.base().write_plain(self.contract_type(), as_legacy, &mut out);
        match self {
            ContractConfig::Oracle(config) => config.write_plain(&mut out),
            ContractConfig::OracleBeam(config) => config.write_plain(&mut out),
            ContractConfig::Subscriptions(config) => config.write_plain(&mut out),
            ContractConfig::Dao(config) => config.write_plain(&mut out),
        }
        Value::Object(out)
    }
}

impl ContractSettings for ContractConfig {
    fn base(&self) -> &ContractBase {
        match self {
            ContractConfig::Oracle(config) => &config.base,
            ContractConfig::OracleBeam(config) => &config.oracle.base,
            ContractConfig::Subscriptions(config) => &config.base,
            ContractConfig::Dao(config) => &config.base,
        }
    }

    fn contract_type(&self) -> ContractType {
        match self {
            ContractConfig::Oracle(_) => ContractType::Oracle,
            ContractConfig::OracleBeam(_) => ContractType::OracleBeam,
            ContractConfig::Subscriptions(_) => ContractType::Subscriptions,
            ContractConfig::Dao(_) => ContractType::Dao,
        }
    }
}

impl Canonical for ContractConfig {
    fn to_plain(&self) -> Value {
        self.to_plain_with(true)
    }
}

fn is_legacy_shape(raw: &Map<String, Value>) -> bool {
    raw::field(raw, "oracleId").is_some()
        || raw::field(raw, "contractId").is_none()
        || raw::field(raw, "type").is_none()
}

/// Rewrite the legacy `oracleId` shape into the current one.
fn normalize_legacy(raw: &Map<String, Value>) -> Result<(Cow<'_, Map<String, Value>>, bool), String> {
    if !is_legacy_shape(raw) {
        return Ok((Cow::Borrowed(raw), false));
    }
    let oracle_id = raw::field(raw, "oracleId");
    let contract_id = raw::field(raw, "contractId");
    if let Some(oracle_id) = oracle_id {
        if contract_id.is_some() || raw::field(raw, "type").is_some() {
            let id = oracle_id.as_str().unwrap_or_default();
            return Err(format!("Cannot mix legacy and new contract format. {}", id));
        }
    }
    let mut normalized = raw.clone();
    if raw::field(raw, "type").is_none() {
        normalized.insert("type".into(), Value::from(ContractType::Oracle.as_str()));
    }
    if contract_id.is_none() {
        if let Some(oracle_id) = oracle_id {
            normalized.insert("contractId".into(), oracle_id.clone());
        }
    }
    normalized.remove("oracleId");
    Ok((Cow::Owned(normalized), true))
}
