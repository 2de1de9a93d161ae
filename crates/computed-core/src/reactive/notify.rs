#![forbid(unsafe_code)]

//! Change notification dispatch.
//!
//! [`notify`] looks up the bindings registered under a key on one object and
//! fires them in registration order. Firing a binding marks its computed field
//! dirty; when that flips the field from clean to dirty, the field's own name
//! is dispatched on its home object as well, so computed fields declared over
//! other computed fields are invalidated transitively. Only clean-to-dirty
//! transitions cascade, which bounds the walk even for cyclic declarations.
//!
//! The binding list is snapshotted before any callback runs; no borrow of the
//! table is held while dirty flags propagate.

use super::computed::ComputedField;
use super::object::ReactiveObject;

/// Fire every binding registered under `key` on `object`.
///
/// Unknown keys are a no-op.
pub fn notify(object: &ReactiveObject, key: &str) {
    let bindings = object.bindings_snapshot(key);
    if bindings.is_empty() {
        return;
    }
    tracing::debug!(message = "notify.dispatch", key, bindings = bindings.len());
    let mut dead = 0usize;
    for binding in &bindings {
        if !binding.fire() {
            dead += 1;
        }
    }
    if dead > 0 {
        object.prune_bindings(key);
    }
}

/// Mark `field` dirty, cascading to its dependents on a clean-to-dirty flip.
pub(crate) fn mark_dirty(field: &ComputedField) {
    if !field.set_dirty() {
        return;
    }
    if let Some((home, name)) = field.home() {
        notify(&home, &name);
    }
}
