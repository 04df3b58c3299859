//! Oracle and OracleBeam contract settings.

use super::ContractBase;
use crate::asset::Asset;
use crate::issues::{ValidationIssues, INVALID_OR_NOT_DEFINED, NOT_DEFINED};
use crate::keys::is_valid_contract_id;
use crate::raw;
use quorum_canonical::{amount, Canonical};
use serde_json::{json, Map, Value};

/// Oracle resolution must be a whole number of these (one minute).
pub const TIMEFRAME_UNIT_MS: u64 = 60_000;

/// Number of invocation cost tiers on an OracleBeam contract.
pub const INVOCATION_COSTS_LEN: usize = 5;

/// Fee charged by an oracle for reads, paid in `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeConfig {
    /// Fee token contract id
    pub token: String,
    /// Fee amount in token stroops
    pub fee: u128,
}

impl FeeConfig {
    fn from_raw(raw: &Value) -> Result<Self, &'static str> {
        let map = raw.as_object().ok_or(INVALID_OR_NOT_DEFINED)?;
        let token = raw::field(map, "token")
            .and_then(raw::text)
            .filter(|token| is_valid_contract_id(token))
            .ok_or("token is invalid or not defined")?;
        let fee = raw::field(map, "fee")
            .and_then(raw::amount)
            .filter(|fee| *fee > 0)
            .ok_or("fee is invalid or not defined")?;
        Ok(Self {
            token: token.to_string(),
            fee,
        })
    }
}

impl Canonical for FeeConfig {
    fn to_plain(&self) -> Value {
        json!({
            "fee": amount(self.fee),
            "token": self.token,
        })
    }
}

/// Price oracle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub base: ContractBase,
    /// Quote asset, immutable after deployment
    pub base_asset: Asset,
    /// Price precision, legacy configs may omit it
    pub decimals: Option<u32>,
    /// Quoted assets in on-chain index order, append-only
    pub assets: Vec<Asset>,
    /// Sampling resolution in milliseconds
    pub timeframe: u64,
    /// History retention in milliseconds
    pub period: u64,
    /// Price source name
    pub data_source: String,
    pub cache_size: Option<u32>,
    pub fee_config: Option<FeeConfig>,
}

impl OracleConfig {
    pub(super) fn parse(
        raw: &Map<String, Value>,
        base: Option<ContractBase>,
        issues: &mut ValidationIssues,
    ) -> Option<Self> {
        let decimals = match raw::field(raw, "decimals") {
            None => Some(None),
            Some(value) => issues
                .require(
                    "decimals",
                    raw::positive(value).and_then(|v| u32::try_from(v).ok()),
                    INVALID_OR_NOT_DEFINED,
                )
                .map(Some),
        };

        let timeframe = issues.require(
            "timeframe",
            raw::field(raw, "timeframe").and_then(raw::positive),
            INVALID_OR_NOT_DEFINED,
        );
        let timeframe = match timeframe {
            Some(timeframe) if timeframe % TIMEFRAME_UNIT_MS != 0 => {
                issues.add("timeframe", "Timeframe should be minutes in milliseconds");
                None
            }
            other => other,
        };

        let period = issues.require(
            "period",
            raw::field(raw, "period")
                .and_then(raw::positive)
                .filter(|period| timeframe.map_or(true, |timeframe| *period > timeframe)),
            INVALID_OR_NOT_DEFINED,
        );

        let base_asset = match raw::field(raw, "baseAsset") {
            None => issues.require("baseAsset", None, NOT_DEFINED),
            Some(value) => issues.check("baseAsset", Asset::from_raw(value)),
        };

        let assets = issues.check("assets", parse_assets(raw::field(raw, "assets")));

        let data_source = issues.require(
            "dataSource",
            raw::field(raw, "dataSource").and_then(raw::text),
            NOT_DEFINED,
        );

        let cache_size = match raw::field(raw, "cacheSize") {
            None => Some(None),
            Some(value) => issues
                .require(
                    "cacheSize",
                    raw::positive(value).and_then(|v| u32::try_from(v).ok()),
                    INVALID_OR_NOT_DEFINED,
                )
                .map(Some),
        };

        let fee_config = match raw::field(raw, "feeConfig") {
            None => Some(None),
            Some(value) => issues.check("feeConfig", FeeConfig::from_raw(value)).map(Some),
        };

        Some(Self {
            base: base?,
            base_asset: base_asset?,
            decimals: decimals?,
            assets: assets?,
            timeframe: timeframe?,
            period: period?,
            data_source: data_source?.to_string(),
            cache_size: cache_size?,
            fee_config: fee_config?,
        })
    }

    pub(super) fn write_plain(&self, out: &mut Map<String, Value>) {
        out.insert("baseAsset".into(), self.base_asset.to_plain());
        if let Some(decimals) = self.decimals {
            out.insert("decimals".into(), Value::from(decimals));
        }
        out.insert(
            "assets".into(),
            Value::Array(self.assets.iter().map(Canonical::to_plain).collect()),
        );
        out.insert("timeframe".into(), Value::from(self.timeframe));
        out.insert("period".into(), Value::from(self.period));
        out.insert("dataSource".into(), Value::from(self.data_source.as_str()));
        if let Some(cache_size) = self.cache_size {
            out.insert("cacheSize".into(), Value::from(cache_size));
        }
        if let Some(fee_config) = &self.fee_config {
            out.insert("feeConfig".into(), fee_config.to_plain());
        }
    }
}

fn parse_assets(raw: Option<&Value>) -> Result<Vec<Asset>, String> {
    let items = raw
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or(INVALID_OR_NOT_DEFINED)?;
    let mut assets: Vec<Asset> = Vec::with_capacity(items.len());
    for item in items {
        let asset = Asset::from_raw(item).map_err(|err| err.to_string())?;
        if assets.contains(&asset) {
            return Err("Duplicate asset found in assets".to_string());
        }
        assets.push(asset);
    }
    Ok(assets)
}

/// Oracle with per-tier invocation cost accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleBeamConfig {
    pub oracle: OracleConfig,
    pub invocation_costs: Option<[u128; INVOCATION_COSTS_LEN]>,
}

impl OracleBeamConfig {
    pub(super) fn parse(
        raw: &Map<String, Value>,
        base: Option<ContractBase>,
        issues: &mut ValidationIssues,
    ) -> Option<Self> {
        let oracle = OracleConfig::parse(raw, base, issues);
        // older writers used the singular key
        let costs = raw::field(raw, "invocationCosts").or_else(|| raw::field(raw, "invocationCost"));
        let invocation_costs = match costs {
            None => Some(None),
            Some(value) => issues
                .require(
                    "invocationCosts",
                    parse_invocation_costs(value),
                    "invocationCosts must be an array of 5 integer amounts",
                )
                .map(Some),
        };
        Some(Self {
            oracle: oracle?,
            invocation_costs: invocation_costs?,
        })
    }

    pub(super) fn write_plain(&self, out: &mut Map<String, Value>) {
        self.oracle.write_plain(out);
        if let Some(costs) = &self.invocation_costs {
            out.insert(
                "invocationCosts".into(),
                Value::Array(costs.iter().copied().map(amount).collect()),
            );
        }
    }
}

fn parse_invocation_costs(raw: &Value) -> Option<[u128; INVOCATION_COSTS_LEN]> {
    let items = raw.as_array()?;
    let costs: Vec<u128> = items.iter().map(raw::amount).collect::<Option<_>>()?;
    costs.try_into().ok()
}
