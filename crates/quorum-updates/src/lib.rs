//! Update derivation for the quorum.
//!
//! When an operator proposes a new [`Config`](quorum_config::Config), every
//! validator independently derives the minimal set of on-chain updates
//! between its current config and the proposal, hashes the result and
//! co-signs it only if the hashes agree.
//!
//! The derivation is strict about what may change at once:
//!
//! - at most one global change (validator set, code hash, or contract set)
//! - a global change never travels with contract changes
//! - at most one on-chain change per contract, and one across contracts
//! - immutable contract fields never change
//! - oracle assets are append-only
//!
//! Anything else is rejected with an [`Error`] naming the rule; there is no
//! partial result.

mod changes;
mod derive;
mod error;
mod update;

pub use changes::{list_changes, map_changes, ChangeSet, Modified};
pub use derive::{derive_updates, derive_updates_with, updates_to_plain, CombinationPolicy, Updates};
pub use error::{Error, Result};
pub use update::{ContractTarget, Update, UpdateKind, UpdatePayload};
