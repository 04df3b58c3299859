//! Added/removed/modified classification of two keyed collections.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::Display;

/// An element present on both sides with different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modified<'a, V> {
    pub new: &'a V,
    pub current: &'a V,
}

/// Result of comparing a new collection against the current one.
///
/// Classes are in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<'a, V> {
    pub added: Vec<&'a V>,
    pub removed: Vec<&'a V>,
    pub modified: Vec<Modified<'a, V>>,
    pub unmodified: Vec<&'a V>,
}

impl<'a, V> ChangeSet<'a, V> {
    /// Nothing was added, removed or modified.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Some key appeared or disappeared.
    pub fn has_membership_change(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

fn classify<'a, K: Ord, V: PartialEq>(
    new: BTreeMap<K, &'a V>,
    mut current: BTreeMap<K, &'a V>,
) -> ChangeSet<'a, V> {
    let mut changes = ChangeSet {
        added: Vec::new(),
        removed: Vec::new(),
        modified: Vec::new(),
        unmodified: Vec::new(),
    };
    for (key, new_item) in new {
        match current.remove(&key) {
            None => changes.added.push(new_item),
            Some(current_item) if current_item == new_item => changes.unmodified.push(new_item),
            Some(current_item) => changes.modified.push(Modified {
                new: new_item,
                current: current_item,
            }),
        }
    }
    changes.removed.extend(current.into_values());
    changes
}

/// Compare two maps by key.
pub fn map_changes<'a, K: Ord, V: PartialEq>(
    new: &'a BTreeMap<K, V>,
    current: &'a BTreeMap<K, V>,
) -> ChangeSet<'a, V> {
    classify(new.iter().collect(), current.iter().collect())
}

/// Compare two lists whose elements are identified by `key`.
///
/// Fails when the new list repeats a key; `collection` names the list in
/// that error.
pub fn list_changes<'a, K, V, F>(
    new: &'a [V],
    current: &'a [V],
    key: F,
    collection: &str,
) -> Result<ChangeSet<'a, V>>
where
    K: Ord + Display,
    V: PartialEq,
    F: Fn(&'a V) -> K,
{
    let mut new_index = BTreeMap::new();
    for item in new {
        let item_key = key(item);
        if new_index.contains_key(&item_key) {
            return Err(Error::DuplicateKey {
                key: item_key.to_string(),
                collection: collection.to_string(),
            });
        }
        new_index.insert(item_key, item);
    }
    let current_index = current.iter().map(|item| (key(item), item)).collect();
    Ok(classify(new_index, current_index))
}
