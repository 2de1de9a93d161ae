#![forbid(unsafe_code)]

//! Reactive arrays: mutation through a proxy notifies the owning field.
//!
//! A [`ReactiveArray`] is a handle to "the list stored at field `F` of object
//! `O`". It owns nothing; each operation resolves the live list again.
//!
//! Every mutator
//!
//! 1. performs the change on the real list,
//! 2. dispatches notification for `F` on `O`,
//! 3. re-indexes the computed fields bound to `F` (when
//!    [`reindex_on_replace`](crate::ReactiveConfig::reindex_on_replace) is
//!    set), so per-element paths such as `items.@each.name` follow inserted,
//!    removed, replaced, and reordered elements.
//!
//! Readers pass straight through to the list and never notify.
//!
//! Mutators fail with [`ReactiveError::NotAList`] once `F` no longer holds a
//! list, and index-based mutators fail with
//! [`ReactiveError::IndexOutOfBounds`] instead of panicking. A failed
//! operation leaves the list unchanged and notifies nothing.

use std::cmp::Ordering;

use crate::error::{ReactiveError, Result};
use crate::value::{Value, join_items};

use super::binding;
use super::notify;
use super::object::ReactiveObject;

/// Proxy over a list-valued field of a [`ReactiveObject`].
#[derive(Debug, Clone)]
pub struct ReactiveArray {
    owner: ReactiveObject,
    field: String,
}

impl ReactiveArray {
    pub(crate) fn new(owner: ReactiveObject, field: &str) -> Self {
        Self {
            owner,
            field: field.to_owned(),
        }
    }

    /// The object holding the list.
    #[must_use]
    pub fn owner(&self) -> &ReactiveObject {
        &self.owner
    }

    /// The field name the list is stored under.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    // -- mutators ----------------------------------------------------------

    /// Append; returns the new length.
    pub fn push(&self, value: impl Into<Value>) -> Result<usize> {
        let value = value.into();
        self.mutate("push", |items| {
            items.push(value);
            Ok(items.len())
        })
    }

    /// Prepend; returns the new length.
    pub fn unshift(&self, value: impl Into<Value>) -> Result<usize> {
        let value = value.into();
        self.mutate("unshift", |items| {
            items.insert(0, value);
            Ok(items.len())
        })
    }

    /// Remove the last element.
    pub fn pop(&self) -> Result<Option<Value>> {
        self.mutate("pop", |items| Ok(items.pop()))
    }

    /// Remove the first element.
    pub fn shift(&self) -> Result<Option<Value>> {
        self.mutate("shift", |items| {
            Ok((!items.is_empty()).then(|| items.remove(0)))
        })
    }

    /// Remove `delete_count` elements starting at `start` and insert `items`
    /// in their place; returns the removed elements.
    ///
    /// `start` is clamped to the length and `delete_count` to what remains,
    /// so `splice(len, 0, ..)` appends.
    pub fn splice<I, T>(&self, start: usize, delete_count: usize, items: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let inserted: Vec<Value> = items.into_iter().map(Into::into).collect();
        self.mutate("splice", |list| {
            let start = start.min(list.len());
            let end = start + delete_count.min(list.len() - start);
            Ok(list.splice(start..end, inserted).collect())
        })
    }

    /// Insert at `index` (`index == len` appends).
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let field = &self.field;
        self.mutate("insert", |items| {
            if index > items.len() {
                return Err(out_of_bounds(field, index, items.len()));
            }
            items.insert(index, value);
            Ok(())
        })
    }

    /// Remove and return the element at `index`.
    pub fn remove(&self, index: usize) -> Result<Value> {
        let field = &self.field;
        self.mutate("remove", |items| {
            if index >= items.len() {
                return Err(out_of_bounds(field, index, items.len()));
            }
            Ok(items.remove(index))
        })
    }

    /// Replace the element at `index`; returns the previous element.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        let field = &self.field;
        self.mutate("set", |items| match items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(out_of_bounds(field, index, items.len())),
        })
    }

    /// Sort in place with [`Value::compare`].
    pub fn sort(&self) -> Result<()> {
        self.mutate("sort", |items| {
            items.sort_by(Value::compare);
            Ok(())
        })
    }

    /// Sort in place with a caller-supplied comparator.
    ///
    /// The list is detached from its slot while `compare` runs.
    pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) -> Result<()> {
        self.mutate("sort", |items| {
            items.sort_by(compare);
            Ok(())
        })
    }

    // -- readers -----------------------------------------------------------

    /// Length of the live list (0 if the field no longer holds one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.owner.with_list(&self.field, <[Value]>::len).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.owner
            .with_list(&self.field, |items| items.get(index).cloned())
            .flatten()
    }

    /// Snapshot of the live list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.owner
            .with_list(&self.field, <[Value]>::to_vec)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn join(&self, sep: &str) -> String {
        self.owner
            .with_list(&self.field, |items| join_items(items, sep))
            .unwrap_or_default()
    }

    /// Borrow the live list.
    ///
    /// # Panics
    ///
    /// Panics if `f` writes to the owning object (re-entrant borrow).
    pub fn with<R>(&self, f: impl FnOnce(&[Value]) -> R) -> Option<R> {
        self.owner.with_list(&self.field, f)
    }

    /// Detach the list, apply `op`, put it back, then notify and re-index.
    fn mutate<R>(
        &self,
        op: &'static str,
        apply: impl FnOnce(&mut Vec<Value>) -> Result<R>,
    ) -> Result<R> {
        let mut items = self
            .owner
            .take_list(&self.field)
            .ok_or_else(|| ReactiveError::not_a_list(&self.field))?;
        let outcome = apply(&mut items);
        let len = items.len();
        self.owner.restore_list(&self.field, items);
        let value = outcome?;

        tracing::debug!(
            message = "array.mutate",
            field = self.field.as_str(),
            op,
            len
        );
        notify::notify(&self.owner, &self.field);
        if self.owner.config().reindex_on_replace {
            binding::reindex_bound(&self.owner, &self.field);
        }
        Ok(value)
    }
}

fn out_of_bounds(field: &str, index: usize, len: usize) -> ReactiveError {
    ReactiveError::IndexOutOfBounds {
        field: field.to_owned(),
        index,
        len,
    }
}
