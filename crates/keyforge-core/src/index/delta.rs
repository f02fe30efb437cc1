use crate::{index::event::DeltaOp, value::Value};
use std::collections::HashMap;

///
/// KeyDelta
///
/// Net key multiplicities produced by a batch of change events.
///
/// Opposing operations on the same key cancel: an add first consumes a
/// pending removal of that key and only then counts as an insertion, and
/// the other way around. An entry whose count reaches zero is removed, so
/// both maps only ever hold positive counts.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyDelta {
    to_add: HashMap<Value, u64>,
    to_remove: HashMap<Value, u64>,
}

impl KeyDelta {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_add(&mut self, key: Value) {
        if !decrement(&mut self.to_remove, &key) {
            *self.to_add.entry(key).or_insert(0) += 1;
        }
    }

    pub fn apply_remove(&mut self, key: Value) {
        if !decrement(&mut self.to_add, &key) {
            *self.to_remove.entry(key).or_insert(0) += 1;
        }
    }

    /// Replace `old` with `new`: remove first, then add.
    pub fn apply_update(&mut self, old: Value, new: Value) {
        self.apply_remove(old);
        self.apply_add(new);
    }

    pub(crate) fn apply(&mut self, op: DeltaOp) {
        match op {
            DeltaOp::Add(key) => self.apply_add(key),
            DeltaOp::Remove(key) => self.apply_remove(key),
        }
    }

    #[must_use]
    pub const fn keys_to_add(&self) -> &HashMap<Value, u64> {
        &self.to_add
    }

    #[must_use]
    pub const fn keys_to_remove(&self) -> &HashMap<Value, u64> {
        &self.to_remove
    }

    #[must_use]
    pub fn add_count(&self, key: &Value) -> u64 {
        self.to_add.get(key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn remove_count(&self, key: &Value) -> u64 {
        self.to_remove.get(key).copied().unwrap_or(0)
    }

    /// Total pending insertions, counting multiplicity.
    #[must_use]
    pub fn inserts(&self) -> u64 {
        self.to_add.values().sum()
    }

    /// Total pending removals, counting multiplicity.
    #[must_use]
    pub fn removes(&self) -> u64 {
        self.to_remove.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (HashMap<Value, u64>, HashMap<Value, u64>) {
        (self.to_add, self.to_remove)
    }
}

// Returns true when a pending count for `key` was consumed.
fn decrement(counts: &mut HashMap<Value, u64>, key: &Value) -> bool {
    let Some(count) = counts.get_mut(key) else {
        return false;
    };

    *count -= 1;
    if *count == 0 {
        counts.remove(key);
    }

    true
}
