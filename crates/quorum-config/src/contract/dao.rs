//! DAO contract settings.

use super::ContractBase;
use crate::issues::{ValidationIssues, INVALID_OR_NOT_DEFINED};
use crate::keys::{is_valid_contract_id, is_valid_public_key};
use crate::raw;
use quorum_canonical::amount;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Governance ballot categories, each with its own deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BallotCategory {
    AddNode = 0,
    AddPriceFeed = 1,
    AddAsset = 2,
    General = 3,
}

impl BallotCategory {
    pub const ALL: [BallotCategory; 4] = [
        BallotCategory::AddNode,
        BallotCategory::AddPriceFeed,
        BallotCategory::AddAsset,
        BallotCategory::General,
    ];

    pub fn from_index(index: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|category| *category as u64 == index)
    }
}

impl fmt::Display for BallotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// DAO contract settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaoConfig {
    pub base: ContractBase,
    /// Initial treasury amount, immutable after deployment
    pub init_amount: u128,
    /// Governance start, immutable after deployment
    pub start_date: u64,
    /// Governance token contract id, immutable after deployment
    pub token: String,
    /// Developer account
    pub developer: String,
    /// Required ballot deposits
    pub deposit_params: BTreeMap<BallotCategory, u128>,
}

impl DaoConfig {
    pub(super) fn parse(
        raw: &Map<String, Value>,
        base: Option<ContractBase>,
        issues: &mut ValidationIssues,
    ) -> Option<Self> {
        let init_amount = issues.require(
            "initAmount",
            raw::field(raw, "initAmount")
                .and_then(raw::amount)
                .filter(|amount| *amount > 0),
            INVALID_OR_NOT_DEFINED,
        );
        let start_date = issues.require(
            "startDate",
            raw::field(raw, "startDate").and_then(raw::positive),
            INVALID_OR_NOT_DEFINED,
        );
        let token = issues.require(
            "token",
            raw::field(raw, "token")
                .and_then(raw::text)
                .filter(|token| is_valid_contract_id(token)),
            INVALID_OR_NOT_DEFINED,
        );
        let developer = issues.require(
            "developer",
            raw::field(raw, "developer")
                .and_then(raw::text)
                .filter(|key| is_valid_public_key(key)),
            INVALID_OR_NOT_DEFINED,
        );
        let deposit_params = parse_deposit_params(raw::field(raw, "depositParams"), issues);
        Some(Self {
            base: base?,
            init_amount: init_amount?,
            start_date: start_date?,
            token: token?.to_string(),
            developer: developer?.to_string(),
            deposit_params: deposit_params?,
        })
    }

    pub(super) fn write_plain(&self, out: &mut Map<String, Value>) {
        out.insert("initAmount".into(), amount(self.init_amount));
        out.insert("startDate".into(), Value::from(self.start_date));
        out.insert("token".into(), Value::from(self.token.as_str()));
        out.insert("developer".into(), Value::from(self.developer.as_str()));
        let deposits: Map<String, Value> = self
            .deposit_params
            .iter()
            .map(|(category, deposit)| (category.to_string(), amount(*deposit)))
            .collect();
        out.insert("depositParams".into(), Value::Object(deposits));
    }
}

fn parse_deposit_params(
    raw: Option<&Value>,
    issues: &mut ValidationIssues,
) -> Option<BTreeMap<BallotCategory, u128>> {
    let Some(entries) = raw.and_then(Value::as_object) else {
        issues.add("depositParams", "Deposit params not defined");
        return None;
    };
    let mut deposits = BTreeMap::new();
    let mut valid = true;
    for (key, value) in entries {
        let path = format!("depositParams.{}", key);
        let Some(category) = key.parse().ok().and_then(BallotCategory::from_index) else {
            issues.add(path, "invalid deposit category");
            valid = false;
            continue;
        };
        let Some(deposit) = raw::amount(value) else {
            issues.add(path, format!("invalid deposit value '{}'", value));
            valid = false;
            continue;
        };
        deposits.insert(category, deposit);
    }
    valid.then_some(deposits)
}
