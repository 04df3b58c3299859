//! Subscriptions contract settings.

use super::ContractBase;
use crate::issues::{ValidationIssues, INVALID_OR_NOT_DEFINED};
use crate::keys::is_valid_contract_id;
use crate::raw;
use serde_json::{Map, Value};

/// Data source wildcard: every contract in the network.
pub const ALL_DATA_SOURCES: &str = "*";

/// Subscriptions contract settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionsConfig {
    pub base: ContractBase,
    /// Base subscription fee
    pub base_fee: u64,
    /// Fee token contract id, immutable after deployment
    pub token: String,
    /// Oracle contracts that may be subscribed to, or `["*"]`
    pub data_sources: Vec<String>,
}

impl SubscriptionsConfig {
    pub(super) fn parse(
        raw: &Map<String, Value>,
        base: Option<ContractBase>,
        issues: &mut ValidationIssues,
    ) -> Option<Self> {
        let base_fee = issues.require(
            "baseFee",
            raw::field(raw, "baseFee").and_then(raw::positive),
            INVALID_OR_NOT_DEFINED,
        );
        let token = issues.require(
            "token",
            raw::field(raw, "token")
                .and_then(raw::text)
                .filter(|token| is_valid_contract_id(token)),
            INVALID_OR_NOT_DEFINED,
        );
        let data_sources = issues.check("dataSources", parse_data_sources(raw::field(raw, "dataSources")));
        Some(Self {
            base: base?,
            base_fee: base_fee?,
            token: token?.to_string(),
            data_sources: data_sources?,
        })
    }

    /// True when every contract is an allowed data source.
    pub fn accepts_all_sources(&self) -> bool {
        self.data_sources.len() == 1 && self.data_sources[0] == ALL_DATA_SOURCES
    }

    pub(super) fn write_plain(&self, out: &mut Map<String, Value>) {
        out.insert("baseFee".into(), Value::from(self.base_fee));
        out.insert("token".into(), Value::from(self.token.as_str()));
        out.insert(
            "dataSources".into(),
            Value::Array(self.data_sources.iter().map(|s| Value::from(s.as_str())).collect()),
        );
    }
}

fn parse_data_sources(raw: Option<&Value>) -> Result<Vec<String>, String> {
    let items = raw
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or(INVALID_OR_NOT_DEFINED)?;
    if items.len() == 1 && items[0].as_str() == Some(ALL_DATA_SOURCES) {
        return Ok(vec![ALL_DATA_SOURCES.to_string()]);
    }
    let mut sources: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let source = item
            .as_str()
            .filter(|id| is_valid_contract_id(id))
            .ok_or_else(|| format!("Invalid data source: {}", item))?;
        if sources.iter().any(|existing| existing == source) {
            return Err("Duplicate data source found in data sources".to_string());
        }
        sources.push(source.to_string());
    }
    Ok(sources)
}
