#![forbid(unsafe_code)]

//! Reverse binding index: dependency key → computed fields to mark dirty.
//!
//! # Indexing
//!
//! For a computed field assigned at `F` on object `O`, every declared path is
//! split on `.` and walked from `O`:
//!
//! ```text
//! at an object:   bind (object, segment) → F, descend into the child slot
//! at a list:      wildcard segment ("[]", "@each") is consumed; the walk then
//!                 continues independently from every element with the
//!                 remaining segments (the current segment included when it
//!                 is not a wildcard)
//! anything else:  stop silently
//! ```
//!
//! The walk never calls getters: a segment that lands on a computed slot is
//! bound and the walk stops there.
//!
//! # Lifecycle
//!
//! Each computed field records where it registered. With
//! [`ReactiveConfig::strict_bindings`](crate::ReactiveConfig) enabled,
//! re-indexing evicts those registrations first, so bindings on replaced
//! nested objects disappear. Without it, bindings only accumulate; a stale one
//! merely sets a dirty flag, and recompute always reads live state.
//!
//! Bindings hold weak handles. Entries whose descriptor has been dropped are
//! pruned the next time their key is dispatched.

use ahash::AHashMap;

use crate::config::ReactiveConfig;
use crate::value::Value;

use super::computed::{ComputedField, WeakComputed};
use super::object::ReactiveObject;

/// One registered dirty-marking callback.
#[derive(Clone)]
pub(crate) struct Binding {
    target: WeakComputed,
}

impl Binding {
    /// Mark the bound field dirty. Returns false if the field is gone.
    pub(crate) fn fire(&self) -> bool {
        match self.target.upgrade() {
            Some(field) => {
                super::notify::mark_dirty(&field);
                true
            }
            None => false,
        }
    }
}

/// Per-object table of bindings, keyed by field name or path segment.
///
/// Entries for a key keep registration order. Registering the same computed
/// field twice under one key is a no-op.
#[derive(Default)]
pub(crate) struct BindingTable {
    entries: AHashMap<String, Vec<Binding>>,
}

impl BindingTable {
    /// Returns true if a new entry was added.
    pub(crate) fn bind(&mut self, key: &str, field: &ComputedField) -> bool {
        let list = self.entries.entry(key.to_owned()).or_default();
        if list.iter().any(|b| b.target.points_to(field)) {
            return false;
        }
        list.push(Binding {
            target: field.downgrade(),
        });
        true
    }

    /// Remove every entry under `key` pointing at `field`.
    pub(crate) fn unbind(&mut self, key: &str, field: &ComputedField) -> usize {
        let Some(list) = self.entries.get_mut(key) else {
            return 0;
        };
        let before = list.len();
        list.retain(|b| !b.target.points_to(field));
        let removed = before - list.len();
        if list.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Snapshot of the entries under `key`, in registration order.
    pub(crate) fn bindings(&self, key: &str) -> Vec<Binding> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Live computed fields bound under `key`, in registration order.
    pub(crate) fn live(&self, key: &str) -> Vec<ComputedField> {
        self.entries
            .get(key)
            .map(|list| list.iter().filter_map(|b| b.target.upgrade()).collect())
            .unwrap_or_default()
    }

    /// Drop entries whose descriptor no longer exists.
    pub(crate) fn prune(&mut self, key: &str) {
        if let Some(list) = self.entries.get_mut(key) {
            list.retain(|b| b.target.is_live());
            if list.is_empty() {
                self.entries.remove(key);
            }
        }
    }

    /// Number of entries under `key`, including dead ones not yet pruned.
    pub(crate) fn len(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, Vec::len)
    }
}

/// Build bindings for `field` from its home object.
///
/// Fields without a live home are left untouched.
pub(crate) fn index_computed(field: &ComputedField) {
    let Some((home, name)) = field.home() else {
        return;
    };
    let config = home.config_handle();
    if config.strict_bindings {
        evict(field);
    }
    let mut added = 0usize;
    for path in field.dependency_paths() {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        added += walk(field, Value::Object(home.clone()), &segments, &config);
    }
    tracing::debug!(
        message = "binding.index",
        field = name.as_str(),
        paths = field.dependency_paths().len(),
        added
    );
}

fn walk(field: &ComputedField, node: Value, segments: &[&str], config: &ReactiveConfig) -> usize {
    let Some((head, rest)) = segments.split_first() else {
        return 0;
    };
    match node {
        Value::Object(object) => {
            if config.is_wildcard(head) {
                return 0;
            }
            let mut added = usize::from(object.bind(head, field));
            if let Some(child) = object.peek_node(head) {
                added += walk(field, child, rest, config);
            }
            added
        }
        Value::List(items) => {
            let remaining = if config.is_wildcard(head) { rest } else { segments };
            items
                .into_iter()
                .map(|item| walk(field, item, remaining, config))
                .sum()
        }
        _ => 0,
    }
}

/// Remove every binding `field` registered.
pub(crate) fn evict(field: &ComputedField) {
    let mut removed = 0usize;
    for registration in field.take_registrations() {
        if let Some(object) = ReactiveObject::upgrade(&registration.object) {
            removed += object.unbind(&registration.key, field);
        }
    }
    if removed > 0 {
        tracing::debug!(message = "binding.evict", removed);
    }
}

/// Re-index every computed field bound under `key` on `object`.
///
/// Called after the value behind `key` changed shape, so paths that pass
/// through it pick up the new nodes.
pub(crate) fn reindex_bound(object: &ReactiveObject, key: &str) {
    let dependents = object.live_bindings(key);
    if dependents.is_empty() {
        return;
    }
    tracing::debug!(
        message = "binding.reindex",
        key,
        dependents = dependents.len()
    );
    for field in &dependents {
        index_computed(field);
    }
}
