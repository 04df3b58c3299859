//! Validator-set change predicates.

use crate::majority::has_majority;
use std::collections::HashSet;
use std::hash::Hash;

/// Validators present both before and after a change, in `current` order.
pub fn retained<'a, T: Eq + Hash>(current: &'a [T], new: &[T]) -> Vec<&'a T> {
    let new: HashSet<&T> = new.iter().collect();
    let mut seen = HashSet::new();
    current
        .iter()
        .filter(|validator| new.contains(validator) && seen.insert(*validator))
        .collect()
}

/// A validator-set change is safe when a majority of the old set survives.
///
/// # Examples
///
/// ```
/// use quorum_consensus::is_allowed_validators_update;
///
/// assert!(is_allowed_validators_update(&["A", "B", "C"], &["A", "B", "D"]));
/// assert!(!is_allowed_validators_update(&["A", "B", "C"], &["A", "D", "E"]));
/// ```
pub fn is_allowed_validators_update<T: Eq + Hash>(current: &[T], new: &[T]) -> bool {
    let unique: HashSet<&T> = current.iter().collect();
    has_majority(unique.len(), retained(current, new).len())
}

/// Every validator retained across the change must have signed.
///
/// Used by the approval gate before an update is applied: validators that
/// are leaving or joining do not gate the change, the survivors do.
pub fn all_required_signatures_present<T: Eq + Hash>(
    current: &[T],
    new: &[T],
    signers: &[T],
) -> bool {
    let signers: HashSet<&T> = signers.iter().collect();
    retained(current, new)
        .into_iter()
        .all(|validator| signers.contains(validator))
}
