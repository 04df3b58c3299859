//! The closed set of updates a proposal can resolve to.
//!
//! Global updates (`nodes`, `wasm`, `contracts`, `config`) affect the whole
//! network; every other kind targets one contract and carries its id and
//! admin. Each update only carries what the transaction layer needs to act on
//! it, and checks that payload on construction.

use crate::error::{Error, Result};
use quorum_canonical::{amount, plain_map, Canonical};
use quorum_config::contract::INVOCATION_COSTS_LEN;
use quorum_config::{
    is_valid_contract_id, is_valid_public_key, Asset, BallotCategory, Config, ContractConfig,
    ContractSettings, ContractType, FeeConfig, Node, WasmHash,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Update discriminant, as written in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Nodes,
    Wasm,
    Contracts,
    Config,
    OracleAssets,
    OracleHistoryPeriod,
    OracleCacheSize,
    OracleFeeConfig,
    OracleInvocationCosts,
    SubscriptionsFee,
    DaoDeposits,
}

impl UpdateKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            UpdateKind::Nodes => "nodes",
            UpdateKind::Wasm => "wasm",
            UpdateKind::Contracts => "contracts",
            UpdateKind::Config => "config",
            UpdateKind::OracleAssets => "oracle_assets",
            UpdateKind::OracleHistoryPeriod => "oracle_history_period",
            UpdateKind::OracleCacheSize => "oracle_cache_size",
            UpdateKind::OracleFeeConfig => "oracle_fee_config",
            UpdateKind::OracleInvocationCosts => "oracle_invocation_costs",
            UpdateKind::SubscriptionsFee => "subscriptions_fee",
            UpdateKind::DaoDeposits => "dao_deposits",
        }
    }

    /// Network-wide rather than scoped to one contract.
    pub const fn is_global(self) -> bool {
        matches!(
            self,
            UpdateKind::Nodes | UpdateKind::Wasm | UpdateKind::Contracts | UpdateKind::Config
        )
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract a scoped update is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTarget {
    pub contract_id: String,
    pub admin: String,
}

impl ContractTarget {
    /// Target the contract described by `contract`.
    pub fn of(contract: &impl ContractSettings) -> Self {
        Self {
            contract_id: contract.contract_id().to_string(),
            admin: contract.admin().to_string(),
        }
    }

    fn check(&self, kind: UpdateKind) -> Result<()> {
        if !is_valid_contract_id(&self.contract_id) {
            return Err(malformed(kind, "contractId is not valid or undefined"));
        }
        if !is_valid_public_key(&self.admin) {
            return Err(malformed(kind, "admin is not valid or undefined"));
        }
        Ok(())
    }
}

/// What an update changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePayload {
    /// Full validator sets before and after
    Nodes {
        current: BTreeMap<String, Node>,
        new: BTreeMap<String, Node>,
    },
    /// New program hash for one contract kind
    Wasm(WasmHash),
    /// Full contract sets before and after
    Contracts {
        current: BTreeMap<String, ContractConfig>,
        new: BTreeMap<String, ContractConfig>,
    },
    /// Off-chain only change of network parameters
    Config {
        current: Box<Config>,
        new: Box<Config>,
    },
    /// Assets appended to an oracle, in append order
    OracleAssets(Vec<Asset>),
    OracleHistoryPeriod(u64),
    OracleCacheSize(u32),
    OracleFeeConfig(FeeConfig),
    OracleInvocationCosts([u128; INVOCATION_COSTS_LEN]),
    SubscriptionsFee(u64),
    DaoDeposits(BTreeMap<BallotCategory, u128>),
}

/// One atomic change to apply, scheduled at `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    timestamp: u64,
    target: Option<ContractTarget>,
    payload: UpdatePayload,
}

fn malformed(kind: UpdateKind, reason: &'static str) -> Error {
    Error::MalformedPayload { kind, reason }
}

impl Update {
    pub fn nodes(
        timestamp: u64,
        current: BTreeMap<String, Node>,
        new: BTreeMap<String, Node>,
    ) -> Result<Self> {
        if new.is_empty() {
            return Err(malformed(UpdateKind::Nodes, "nodes are required"));
        }
        Ok(Self::global(timestamp, UpdatePayload::Nodes { current, new }))
    }

    pub fn wasm(timestamp: u64, hash: impl Into<String>, contract_type: ContractType) -> Result<Self> {
        let hash = WasmHash::new(hash, contract_type)
            .map_err(|_| malformed(UpdateKind::Wasm, "wasmHash is not valid"))?;
        Ok(Self::global(timestamp, UpdatePayload::Wasm(hash)))
    }

    pub fn contracts(
        timestamp: u64,
        current: BTreeMap<String, ContractConfig>,
        new: BTreeMap<String, ContractConfig>,
    ) -> Result<Self> {
        if current == new {
            return Err(malformed(UpdateKind::Contracts, "contracts are unchanged"));
        }
        Ok(Self::global(timestamp, UpdatePayload::Contracts { current, new }))
    }

    pub fn config(timestamp: u64, current: Config, new: Config) -> Result<Self> {
        if new.equals(&current, false) {
            return Err(malformed(UpdateKind::Config, "config is unchanged"));
        }
        Ok(Self::global(
            timestamp,
            UpdatePayload::Config {
                current: Box::new(current),
                new: Box::new(new),
            },
        ))
    }

    pub fn oracle_assets(timestamp: u64, target: ContractTarget, assets: Vec<Asset>) -> Result<Self> {
        if assets.is_empty() {
            return Err(malformed(UpdateKind::OracleAssets, "assets are required"));
        }
        Self::scoped(timestamp, target, UpdatePayload::OracleAssets(assets))
    }

    pub fn oracle_history_period(timestamp: u64, target: ContractTarget, period: u64) -> Result<Self> {
        if period == 0 {
            return Err(malformed(UpdateKind::OracleHistoryPeriod, "period is required"));
        }
        Self::scoped(timestamp, target, UpdatePayload::OracleHistoryPeriod(period))
    }

    pub fn oracle_cache_size(timestamp: u64, target: ContractTarget, cache_size: u32) -> Result<Self> {
        if cache_size == 0 {
            return Err(malformed(UpdateKind::OracleCacheSize, "cacheSize is required"));
        }
        Self::scoped(timestamp, target, UpdatePayload::OracleCacheSize(cache_size))
    }

    pub fn oracle_fee_config(timestamp: u64, target: ContractTarget, fee_config: FeeConfig) -> Result<Self> {
        if fee_config.fee == 0 {
            return Err(malformed(UpdateKind::OracleFeeConfig, "feeConfig.fee is required"));
        }
        if !is_valid_contract_id(&fee_config.token) {
            return Err(malformed(UpdateKind::OracleFeeConfig, "feeConfig.token is not valid"));
        }
        Self::scoped(timestamp, target, UpdatePayload::OracleFeeConfig(fee_config))
    }

    /// The array type already fixes the length and sign of the costs.
    pub fn oracle_invocation_costs(
        timestamp: u64,
        target: ContractTarget,
        costs: [u128; INVOCATION_COSTS_LEN],
    ) -> Result<Self> {
        Self::scoped(timestamp, target, UpdatePayload::OracleInvocationCosts(costs))
    }

    pub fn subscriptions_fee(timestamp: u64, target: ContractTarget, fee: u64) -> Result<Self> {
        Self::scoped(timestamp, target, UpdatePayload::SubscriptionsFee(fee))
    }

    pub fn dao_deposits(
        timestamp: u64,
        target: ContractTarget,
        deposits: BTreeMap<BallotCategory, u128>,
    ) -> Result<Self> {
        if deposits.is_empty() {
            return Err(malformed(UpdateKind::DaoDeposits, "deposits are required"));
        }
        Self::scoped(timestamp, target, UpdatePayload::DaoDeposits(deposits))
    }

    fn global(timestamp: u64, payload: UpdatePayload) -> Self {
        Self {
            timestamp,
            target: None,
            payload,
        }
    }

    fn scoped(timestamp: u64, target: ContractTarget, payload: UpdatePayload) -> Result<Self> {
        let update = Self::global(timestamp, payload);
        target.check(update.kind())?;
        Ok(Self {
            target: Some(target),
            ..update
        })
    }

    pub fn kind(&self) -> UpdateKind {
        match &self.payload {
            UpdatePayload::Nodes { .. } => UpdateKind::Nodes,
            UpdatePayload::Wasm(_) => UpdateKind::Wasm,
            UpdatePayload::Contracts { .. } => UpdateKind::Contracts,
            UpdatePayload::Config { .. } => UpdateKind::Config,
            UpdatePayload::OracleAssets(_) => UpdateKind::OracleAssets,
            UpdatePayload::OracleHistoryPeriod(_) => UpdateKind::OracleHistoryPeriod,
            UpdatePayload::OracleCacheSize(_) => UpdateKind::OracleCacheSize,
            UpdatePayload::OracleFeeConfig(_) => UpdateKind::OracleFeeConfig,
            UpdatePayload::OracleInvocationCosts(_) => UpdateKind::OracleInvocationCosts,
            UpdatePayload::SubscriptionsFee(_) => UpdateKind::SubscriptionsFee,
            UpdatePayload::DaoDeposits(_) => UpdateKind::DaoDeposits,
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Target contract, `None` for global updates.
    pub fn target(&self) -> Option<&ContractTarget> {
        self.target.as_ref()
    }

    pub fn payload(&self) -> &UpdatePayload {
        &self.payload
    }

    fn write_payload(&self, out: &mut Map<String, Value>) {
        match &self.payload {
            UpdatePayload::Nodes { current, new } => {
                out.insert("currentNodes".into(), plain_map(current));
                out.insert("newNodes".into(), plain_map(new));
            }
            UpdatePayload::Wasm(hash) => {
                out.insert("wasmHash".into(), Value::from(hash.hash.as_str()));
                out.insert("contractType".into(), Value::from(hash.kind.as_str()));
            }
            UpdatePayload::Contracts { current, new } => {
                out.insert("currentConfigs".into(), plain_map(current));
                out.insert("newConfigs".into(), plain_map(new));
            }
            UpdatePayload::Config { current, new } => {
                out.insert("currentConfig".into(), current.to_plain());
                out.insert("newConfig".into(), new.to_plain());
            }
            UpdatePayload::OracleAssets(assets) => {
                out.insert(
                    "assets".into(),
                    Value::Array(assets.iter().map(Canonical::to_plain).collect()),
                );
            }
            UpdatePayload::OracleHistoryPeriod(period) => {
                out.insert("period".into(), Value::from(*period));
            }
            UpdatePayload::OracleCacheSize(cache_size) => {
                out.insert("cacheSize".into(), Value::from(*cache_size));
            }
            UpdatePayload::OracleFeeConfig(fee_config) => {
                out.insert("feeConfig".into(), fee_config.to_plain());
            }
            UpdatePayload::OracleInvocationCosts(costs) => {
                out.insert(
                    "invocationCosts".into(),
                    Value::Array(costs.iter().copied().map(amount).collect()),
                );
            }
            UpdatePayload::SubscriptionsFee(fee) => {
                out.insert("fee".into(), Value::from(*fee));
            }
            UpdatePayload::DaoDeposits(deposits) => {
                let deposits: Map<String, Value> = deposits
                    .iter()
                    .map(|(category, deposit)| (category.to_string(), amount(*deposit)))
                    .collect();
                out.insert("deposits".into(), Value::Object(deposits));
            }
        }
    }
}

impl Canonical for Update {
    fn to_plain(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from(self.kind().as_str()));
        out.insert("timestamp".into(), Value::from(self.timestamp));
        if let Some(target) = &self.target {
            out.insert("contractId".into(), Value::from(target.contract_id.as_str()));
            out.insert("admin".into(), Value::from(target.admin.as_str()));
        }
        self.write_payload(&mut out);
        Value::Object(out)
    }
}
