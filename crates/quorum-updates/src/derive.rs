//! Turn two config snapshots into the updates that reconcile them.
//!
//! Every validator runs this independently on the same inputs and then signs
//! the hash of the result, so the outcome must depend on nothing but the two
//! configs and the timestamp.

use crate::changes::{list_changes, map_changes, Modified};
use crate::error::{Error, Result};
use crate::update::{ContractTarget, Update};
use quorum_canonical::Canonical;
use quorum_config::{Asset, Config, ContractConfig, ContractSettings, OracleBeamConfig, OracleConfig};
use quorum_consensus::is_allowed_validators_update;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Derived updates keyed by scope: `None` for the network, or a contract id.
///
/// A `None` value means the contract changed only in ways that need no
/// on-chain action.
pub type Updates = BTreeMap<Option<String>, Option<Update>>;

/// How an on-chain contract update may coexist with off-chain-only changes
/// to other contracts in the same proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombinationPolicy {
    /// The on-chain update must be the only change in the proposal.
    #[default]
    Exclusive,
    /// Other contracts may change fields that never reach the ledger.
    AllowOffChain,
}

fn reject(err: Error) -> Error {
    warn!(error = %err, "Rejected config update");
    err
}

/// Derive updates with the [`CombinationPolicy::Exclusive`] policy every
/// deployed validator applies.
pub fn derive_updates(timestamp: u64, current: &Config, new: &Config) -> Result<Updates> {
    derive_updates_with(timestamp, current, new, CombinationPolicy::Exclusive)
}

/// Derive the updates that take `current` to `new`.
///
/// The result is one of: empty (nothing to do), a single global update keyed
/// by `None`, or per-contract results of which at most one is `Some`.
pub fn derive_updates_with(
    timestamp: u64,
    current: &Config,
    new: &Config,
    policy: CombinationPolicy,
) -> Result<Updates> {
    current.validate().map_err(|issues| {
        reject(Error::InvalidConfig {
            side: "current",
            issues,
        })
    })?;
    new.validate()
        .map_err(|issues| reject(Error::InvalidConfig { side: "new", issues }))?;

    if new.equals(current, true) {
        debug!(timestamp, "Configs are equal, nothing to update");
        return Ok(Updates::new());
    }

    let global = global_update(timestamp, current, new)?;
    let contracts = contract_updates(timestamp, &current.contracts, &new.contracts)?;

    let updates: Updates = match (global, contracts) {
        (Some(_), Some(_)) => return Err(reject(Error::GlobalWithContracts)),
        (Some(update), None) => {
            info!(timestamp, kind = %update.kind(), "Derived global update");
            Updates::from([(None, Some(update))])
        }
        (None, None) => {
            info!(timestamp, "Derived off-chain config update");
            let update = Update::config(timestamp, current.clone(), new.clone())?;
            Updates::from([(None, Some(update))])
        }
        (None, Some(per_contract)) => {
            let on_chain = per_contract.values().flatten().count();
            if on_chain > 1 {
                return Err(reject(Error::MultipleBlockchainUpdates));
            }
            if on_chain == 1 && per_contract.len() > 1 && policy == CombinationPolicy::Exclusive {
                return Err(reject(Error::CombinedUpdates));
            }
            info!(
                timestamp,
                contracts = per_contract.len(),
                on_chain,
                "Derived contract updates"
            );
            per_contract
                .into_iter()
                .map(|(contract_id, update)| (Some(contract_id), update))
                .collect()
        }
    };
    Ok(updates)
}

/// Plain projection of derived updates, the network scope keyed `"global"`.
pub fn updates_to_plain(updates: &Updates) -> Value {
    let plain: Map<String, Value> = updates
        .iter()
        .map(|(scope, update)| {
            let key = scope.clone().unwrap_or_else(|| "global".to_string());
            let value = update.as_ref().map_or(Value::Null, Canonical::to_plain);
            (key, value)
        })
        .collect();
    Value::Object(plain)
}

/// Holds the single update a scope may produce.
struct Slot {
    update: Option<Update>,
    conflict: Error,
}

impl Slot {
    fn new(conflict: Error) -> Self {
        Self {
            update: None,
            conflict,
        }
    }

    fn set(&mut self, update: Option<Update>) -> Result<()> {
        let Some(update) = update else {
            return Ok(());
        };
        if self.update.is_some() {
            return Err(reject(self.conflict.clone()));
        }
        self.update = Some(update);
        Ok(())
    }
}

fn global_update(timestamp: u64, current: &Config, new: &Config) -> Result<Option<Update>> {
    let mut slot = Slot::new(Error::MultipleGlobal);
    slot.set(nodes_update(timestamp, current, new)?)?;
    slot.set(wasm_update(timestamp, current, new)?)?;

    let contracts = map_changes(&new.contracts, &current.contracts);
    if contracts.has_membership_change() {
        debug!(
            added = contracts.added.len(),
            removed = contracts.removed.len(),
            "Contract set changed"
        );
        slot.set(Some(Update::contracts(
            timestamp,
            current.contracts.clone(),
            new.contracts.clone(),
        )?))?;
    }
    Ok(slot.update)
}

fn nodes_update(timestamp: u64, current: &Config, new: &Config) -> Result<Option<Update>> {
    let changes = map_changes(&new.nodes, &current.nodes);
    if changes.is_empty() {
        return Ok(None);
    }
    debug!(
        added = changes.added.len(),
        removed = changes.removed.len(),
        modified = changes.modified.len(),
        "Validator set changed"
    );
    if !is_allowed_validators_update(&current.node_pubkeys(), &new.node_pubkeys()) {
        return Err(reject(Error::MajorityUnreachable));
    }
    Ok(Some(Update::nodes(
        timestamp,
        current.nodes.clone(),
        new.nodes.clone(),
    )?))
}

fn wasm_update(timestamp: u64, current: &Config, new: &Config) -> Result<Option<Update>> {
    let changes = map_changes(new.wasm_hash.entries(), current.wasm_hash.entries());
    if changes.is_empty() {
        return Ok(None);
    }
    debug!(
        added = changes.added.len(),
        removed = changes.removed.len(),
        modified = changes.modified.len(),
        "Wasm hashes changed"
    );
    if !changes.removed.is_empty() {
        return Err(reject(Error::WasmRemoved));
    }
    let mut changed = changes
        .added
        .into_iter()
        .chain(changes.modified.into_iter().map(|modified| modified.new));
    let (Some(hash), None) = (changed.next(), changed.next()) else {
        return Err(reject(Error::MultipleWasm));
    };
    Ok(Some(Update::wasm(timestamp, hash.hash.clone(), hash.kind)?))
}

fn contract_updates(
    timestamp: u64,
    current: &BTreeMap<String, ContractConfig>,
    new: &BTreeMap<String, ContractConfig>,
) -> Result<Option<BTreeMap<String, Option<Update>>>> {
    let changes = map_changes(new, current);
    if changes.modified.is_empty() {
        return Ok(None);
    }
    let mut updates = BTreeMap::new();
    for Modified { new, current } in changes.modified {
        let update = contract_update(timestamp, current, new)?;
        debug!(
            contract = new.contract_id(),
            kind = update.as_ref().map(|u| u.kind().as_str()),
            "Contract settings changed"
        );
        updates.insert(new.contract_id().to_string(), update);
    }
    Ok(Some(updates))
}

fn immutable(contract_id: &str, field: &'static str) -> Error {
    reject(Error::ImmutableField {
        contract: contract_id.to_string(),
        field,
    })
}

fn contract_update(
    timestamp: u64,
    current: &ContractConfig,
    new: &ContractConfig,
) -> Result<Option<Update>> {
    let contract_id = current.contract_id();
    if new.contract_id() != contract_id {
        return Err(immutable(contract_id, "Contract id"));
    }
    if new.admin() != current.admin() {
        return Err(immutable(contract_id, "Admin"));
    }
    if new.contract_type() != current.contract_type() {
        return Err(immutable(contract_id, "Type"));
    }

    let target = ContractTarget::of(new);
    let mut slot = Slot::new(Error::MultiplePerContract {
        contract: contract_id.to_string(),
    });
    settings_updates(timestamp, &target, current, new, &mut slot)?;
    Ok(slot.update)
}

fn settings_updates(
    timestamp: u64,
    target: &ContractTarget,
    current: &ContractConfig,
    new: &ContractConfig,
    slot: &mut Slot,
) -> Result<()> {
    let contract_id = target.contract_id.as_str();
    match new {
        ContractConfig::Oracle(new) => {
            let ContractConfig::Oracle(current) = current else {
                return Err(immutable(contract_id, "Type"));
            };
            oracle_updates(timestamp, target, current, new, slot)
        }
        ContractConfig::OracleBeam(new) => {
            let ContractConfig::OracleBeam(current) = current else {
                return Err(immutable(contract_id, "Type"));
            };
            oracle_beam_updates(timestamp, target, current, new, slot)
        }
        ContractConfig::Subscriptions(new) => {
            let ContractConfig::Subscriptions(current) = current else {
                return Err(immutable(contract_id, "Type"));
            };
            if new.token != current.token {
                return Err(immutable(contract_id, "Token"));
            }
            if new.base_fee != current.base_fee {
                slot.set(Some(Update::subscriptions_fee(
                    timestamp,
                    target.clone(),
                    new.base_fee,
                )?))?;
            }
            Ok(())
        }
        ContractConfig::Dao(new) => {
            let ContractConfig::Dao(current) = current else {
                return Err(immutable(contract_id, "Type"));
            };
            if new.token != current.token {
                return Err(immutable(contract_id, "Token"));
            }
            if new.init_amount != current.init_amount {
                return Err(immutable(contract_id, "Init amount"));
            }
            if new.start_date != current.start_date {
                return Err(immutable(contract_id, "Start date"));
            }
            if !map_changes(&new.deposit_params, &current.deposit_params).is_empty() {
                slot.set(Some(Update::dao_deposits(
                    timestamp,
                    target.clone(),
                    new.deposit_params.clone(),
                )?))?;
            }
            Ok(())
        }
    }
}

fn oracle_updates(
    timestamp: u64,
    target: &ContractTarget,
    current: &OracleConfig,
    new: &OracleConfig,
    slot: &mut Slot,
) -> Result<()> {
    let contract_id = target.contract_id.as_str();
    if new.base_asset != current.base_asset {
        return Err(immutable(contract_id, "Base asset"));
    }
    if new.timeframe != current.timeframe {
        return Err(immutable(contract_id, "Timeframe"));
    }
    if new.decimals != current.decimals {
        return Err(immutable(contract_id, "Decimals"));
    }

    let appended = appended_assets(contract_id, &current.assets, &new.assets)?;
    if !appended.is_empty() {
        slot.set(Some(Update::oracle_assets(timestamp, target.clone(), appended)?))?;
    }
    if new.period != current.period {
        slot.set(Some(Update::oracle_history_period(
            timestamp,
            target.clone(),
            new.period,
        )?))?;
    }
    match (&current.cache_size, &new.cache_size) {
        (Some(_), None) => return Err(removed(contract_id, "Cache size")),
        (current_size, Some(cache_size)) if current_size.as_ref() != Some(cache_size) => {
            slot.set(Some(Update::oracle_cache_size(timestamp, target.clone(), *cache_size)?))?;
        }
        _ => {}
    }
    match (&current.fee_config, &new.fee_config) {
        (Some(_), None) => return Err(removed(contract_id, "Fee config")),
        (current_fee, Some(fee_config)) if current_fee.as_ref() != Some(fee_config) => {
            slot.set(Some(Update::oracle_fee_config(
                timestamp,
                target.clone(),
                fee_config.clone(),
            )?))?;
        }
        _ => {}
    }
    Ok(())
}

fn oracle_beam_updates(
    timestamp: u64,
    target: &ContractTarget,
    current: &OracleBeamConfig,
    new: &OracleBeamConfig,
    slot: &mut Slot,
) -> Result<()> {
    oracle_updates(timestamp, target, &current.oracle, &new.oracle, slot)?;
    match (&current.invocation_costs, &new.invocation_costs) {
        (Some(_), None) => Err(removed(&target.contract_id, "Invocation costs")),
        (current_costs, Some(costs)) if current_costs.as_ref() != Some(costs) => slot.set(Some(
            Update::oracle_invocation_costs(timestamp, target.clone(), *costs)?,
        )),
        _ => Ok(()),
    }
}

fn removed(contract_id: &str, field: &'static str) -> Error {
    reject(Error::RemovedSetting {
        contract: contract_id.to_string(),
        field,
    })
}

/// Assets appended to the end of `current`, in order.
///
/// Existing assets must keep their position; anything else is a hard error.
fn appended_assets(contract_id: &str, current: &[Asset], new: &[Asset]) -> Result<Vec<Asset>> {
    let changes = list_changes(new, current, Asset::code, &format!("{}:assets", contract_id))
        .map_err(reject)?;
    let modified = || {
        reject(Error::AssetsModified {
            contract: contract_id.to_string(),
        })
    };
    if !changes.removed.is_empty() || !changes.modified.is_empty() {
        return Err(modified());
    }
    if new.len() < current.len() || new[..current.len()] != *current {
        return Err(modified());
    }
    Ok(new[current.len()..].to_vec())
}
