#![forbid(unsafe_code)]

//! Reactive objects: field slots with explicit `get`/`set` accessors.
//!
//! # Design
//!
//! [`ReactiveObject`] is a shared handle (`Rc`) over two pieces of state:
//!
//! - the user's fields, an insertion-ordered map of [`Slot`]s;
//! - wrapper metadata (the [`BindingTable`] and the object's
//!   [`ReactiveConfig`]), kept beside the fields rather than inside them.
//!
//! Every read and write goes through [`get`](ReactiveObject::get) and
//! [`set`](ReactiveObject::set). Reads resolve computed slots lazily; writes
//! route through setters, index newly assigned computed fields, re-index
//! paths whose shape changed, and dispatch change notification.
//!
//! # Lists
//!
//! [`get`](ReactiveObject::get) on a list field returns a detached copy:
//! pushing onto the returned `Value::List` changes nothing in the object and
//! notifies nobody. Mutate lists through [`array`](ReactiveObject::array),
//! which returns a [`ReactiveArray`] over the live list.
//!
//! # Invariants
//!
//! 1. No `RefCell` borrow of the fields or the table is held while a getter,
//!    setter, or binding runs.
//! 2. A slot holding a nested object is always [`Slot::Nested`]; writing
//!    `Value::Object` normalizes to it.
//! 3. Notification for a write is dispatched after the slot is updated.
//!
//! # Failure Modes
//!
//! - **Reference cycles**: an object stored (directly or through a list)
//!   inside itself is never freed. Bindings and computed homes are weak and
//!   do not add cycles of their own.
//! - **Re-entrant writes from a getter**: allowed by the borrow discipline,
//!   but the resulting notification order is unspecified.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::config::ReactiveConfig;
use crate::error::Result;
use crate::value::Value;

use super::array::ReactiveArray;
use super::binding::{self, Binding, BindingTable};
use super::computed::ComputedField;
use super::notify;

/// The content of one field.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Plain data, including lists.
    Plain(Value),
    /// A derived value.
    Computed(ComputedField),
    /// A nested reactive object.
    Nested(ReactiveObject),
}

impl Slot {
    fn normalize(self) -> Self {
        match self {
            Self::Plain(Value::Object(object)) => Self::Nested(object),
            other => other,
        }
    }

    fn is_structural(&self) -> bool {
        match self {
            Self::Plain(value) => value.is_structural(),
            Self::Nested(_) => true,
            Self::Computed(_) => false,
        }
    }

    /// The plain value this slot carries, for handing to a setter.
    fn into_value(self) -> Value {
        match self {
            Self::Plain(value) => value,
            Self::Nested(object) => Value::Object(object),
            Self::Computed(field) => field.cached(),
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<ComputedField> for Slot {
    fn from(field: ComputedField) -> Self {
        Self::Computed(field)
    }
}

impl From<ReactiveObject> for Slot {
    fn from(object: ReactiveObject) -> Self {
        Self::Nested(object)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Slot {
    fn from(items: Vec<T>) -> Self {
        Self::Plain(Value::from(items))
    }
}

macro_rules! slot_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Slot {
                fn from(value: $ty) -> Self {
                    Self::Plain(Value::from(value))
                }
            }
        )*
    };
}

slot_from_scalar!(bool, i32, i64, u32, f64, &str, String);

/// Shared interior for [`ReactiveObject`].
pub(crate) struct ObjectInner {
    fields: RefCell<IndexMap<String, Slot>>,
    bindings: RefCell<BindingTable>,
    config: Rc<ReactiveConfig>,
}

/// A live reactive view over a set of named fields.
///
/// Cloning a `ReactiveObject` creates a new handle to the **same** object.
pub struct ReactiveObject {
    inner: Rc<ObjectInner>,
}

impl Clone for ReactiveObject {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Field values may contain this object again; list keys only.
        f.debug_struct("ReactiveObject")
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}

impl Default for ReactiveObject {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveObject {
    /// An empty object with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ReactiveConfig::default())
    }

    /// An empty object with `config`.
    #[must_use]
    pub fn with_config(config: ReactiveConfig) -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                fields: RefCell::new(IndexMap::new()),
                bindings: RefCell::new(BindingTable::default()),
                config: Rc::new(config),
            }),
        }
    }

    /// Wrap a plain mapping. Computed fields already present are indexed.
    pub fn wrap<I, K, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Slot>,
    {
        Self::wrap_with(ReactiveConfig::default(), fields)
    }

    /// Like [`wrap`](Self::wrap), with an explicit configuration.
    pub fn wrap_with<I, K, S>(config: ReactiveConfig, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Slot>,
    {
        let object = Self::with_config(config);
        let mut computed = Vec::new();
        {
            let mut map = object.inner.fields.borrow_mut();
            for (name, slot) in fields {
                let name = name.into();
                let slot = slot.into().normalize();
                if let Slot::Computed(field) = &slot {
                    computed.push((name.clone(), field.clone()));
                }
                map.insert(name, slot);
            }
        }
        for (name, field) in &computed {
            field.set_home(&object, name);
            binding::index_computed(field);
        }
        tracing::debug!(
            message = "object.wrap",
            fields = object.len(),
            computed = computed.len()
        );
        object
    }

    /// Read a field.
    ///
    /// Computed fields return their cache, refreshed first when dirty or
    /// volatile; the getter receives this object as its receiver. Lists are
    /// returned as a snapshot: use [`array`](Self::array) to mutate one in
    /// place. Missing fields read as [`Value::Null`].
    #[must_use]
    pub fn get(&self, name: &str) -> Value {
        let computed = {
            let fields = self.inner.fields.borrow();
            match fields.get(name) {
                None => return Value::Null,
                Some(Slot::Plain(value)) => return value.clone(),
                Some(Slot::Nested(object)) => return Value::Object(object.clone()),
                Some(Slot::Computed(field)) => field.clone(),
            }
        };
        computed.evaluate(self, name)
    }

    /// Write a field.
    ///
    /// - Writing a [`ComputedField`] stores it (replacing whatever was there)
    ///   and indexes its dependency paths.
    /// - Writing anything else into a computed slot calls its setter, or fails
    ///   with [`ReactiveError::ReadOnly`](crate::ReactiveError::ReadOnly) when
    ///   it has none.
    /// - Otherwise the value is stored as is. When the old or new content is
    ///   an object or a list, computed fields bound to `name` are re-indexed.
    ///
    /// Notification for `name` is dispatched after every successful write.
    pub fn set(&self, name: &str, value: impl Into<Slot>) -> Result<()> {
        let incoming = value.into().normalize();
        let existing = match self.inner.fields.borrow().get(name) {
            Some(Slot::Computed(field)) => Some(field.clone()),
            _ => None,
        };

        match (existing, incoming) {
            (previous, Slot::Computed(field)) => {
                if let Some(previous) = previous.filter(|p| !p.ptr_eq(&field)) {
                    if self.inner.config.strict_bindings {
                        binding::evict(&previous);
                    }
                    previous.clear_home();
                }
                self.inner
                    .fields
                    .borrow_mut()
                    .insert(name.to_owned(), Slot::Computed(field.clone()));
                field.set_home(self, name);
                binding::index_computed(&field);
            }
            (Some(current), incoming) => {
                current.assign(name, incoming.into_value())?;
            }
            (None, incoming) => {
                let structural_new = incoming.is_structural();
                let previous = self
                    .inner
                    .fields
                    .borrow_mut()
                    .insert(name.to_owned(), incoming);
                let structural_old = previous.as_ref().is_some_and(Slot::is_structural);
                // Drop the old value outside the borrow.
                drop(previous);
                if (structural_old || structural_new) && self.inner.config.reindex_on_replace {
                    binding::reindex_bound(self, name);
                }
            }
        }

        notify::notify(self, name);
        Ok(())
    }

    /// Reactive proxy over the list stored at `name`, if it holds one.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<ReactiveArray> {
        let is_list = matches!(
            self.inner.fields.borrow().get(name),
            Some(Slot::Plain(Value::List(_)))
        );
        is_list.then(|| ReactiveArray::new(self.clone(), name))
    }

    /// The computed descriptor stored at `name`, if any.
    #[must_use]
    pub fn computed(&self, name: &str) -> Option<ComputedField> {
        match self.inner.fields.borrow().get(name) {
            Some(Slot::Computed(field)) => Some(field.clone()),
            _ => None,
        }
    }

    /// Manually invalidate everything bound to `name`.
    ///
    /// For collaborators that changed nested state without going through
    /// [`set`](Self::set).
    pub fn notify_property_change(&self, name: &str) {
        notify::notify(self, name);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.fields.borrow().contains_key(name)
    }

    /// Field names in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.fields.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.fields.borrow().is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &ReactiveConfig {
        &self.inner.config
    }

    /// Number of bindings registered under `key`, including dead entries
    /// that have not been pruned yet.
    #[must_use]
    pub fn binding_count(&self, key: &str) -> usize {
        self.inner.bindings.borrow().len(key)
    }

    /// Whether both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner).cast::<()>() as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<ObjectInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<ObjectInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn config_handle(&self) -> Rc<ReactiveConfig> {
        Rc::clone(&self.inner.config)
    }

    /// Raw child used by the indexing walk: nested objects and lists only.
    /// Never evaluates a getter.
    pub(crate) fn peek_node(&self, key: &str) -> Option<Value> {
        match self.inner.fields.borrow().get(key)? {
            Slot::Nested(object) => Some(Value::Object(object.clone())),
            Slot::Plain(value) if value.is_structural() => Some(value.clone()),
            _ => None,
        }
    }

    /// Register `field` under `key`, recording the registration on the field.
    pub(crate) fn bind(&self, key: &str, field: &ComputedField) -> bool {
        let added = self.inner.bindings.borrow_mut().bind(key, field);
        if added {
            field.record_registration(self, key);
        }
        added
    }

    pub(crate) fn unbind(&self, key: &str, field: &ComputedField) -> usize {
        self.inner.bindings.borrow_mut().unbind(key, field)
    }

    pub(crate) fn bindings_snapshot(&self, key: &str) -> Vec<Binding> {
        self.inner.bindings.borrow().bindings(key)
    }

    pub(crate) fn live_bindings(&self, key: &str) -> Vec<ComputedField> {
        self.inner.bindings.borrow().live(key)
    }

    pub(crate) fn prune_bindings(&self, key: &str) {
        self.inner.bindings.borrow_mut().prune(key);
    }

    /// Move the list at `key` out of its slot, leaving an empty list behind.
    pub(crate) fn take_list(&self, key: &str) -> Option<Vec<Value>> {
        match self.inner.fields.borrow_mut().get_mut(key)? {
            Slot::Plain(Value::List(items)) => Some(std::mem::take(items)),
            _ => None,
        }
    }

    /// Put a list taken with [`take_list`](Self::take_list) back.
    pub(crate) fn restore_list(&self, key: &str, items: Vec<Value>) {
        if let Some(Slot::Plain(Value::List(slot))) = self.inner.fields.borrow_mut().get_mut(key) {
            *slot = items;
        }
    }

    /// Run `f` over the list at `key` without cloning it.
    pub(crate) fn with_list<R>(&self, key: &str, f: impl FnOnce(&[Value]) -> R) -> Option<R> {
        match self.inner.fields.borrow().get(key)? {
            Slot::Plain(Value::List(items)) => Some(f(items)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
