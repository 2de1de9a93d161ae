#![forbid(unsafe_code)]

//! Computed field descriptors: declared dependency paths plus a getter and an
//! optional setter, with a lazily refreshed cache.
//!
//! # Design
//!
//! [`ComputedField`] wraps its getter, setter, and cached result in shared,
//! reference-counted storage. The binding index holds only weak handles to
//! that storage, so a descriptor that has been replaced and dropped leaves
//! behind bindings that do nothing when fired.
//!
//! # Invariants
//!
//! 1. The cache is returned without calling the getter iff the field is
//!    neither dirty nor volatile.
//! 2. `dirty` starts true; a read clears it, a binding firing sets it.
//! 3. `version` increments by exactly 1 per getter invocation.
//! 4. A field without a setter is read-only; writes fail with
//!    [`ReactiveError::ReadOnly`].
//!
//! # Failure Modes
//!
//! - **Getter panics**: the cache keeps its previous value and the dirty flag
//!   stays set, so the next read retries.
//! - **Getter writes to the object it is reading**: recursive notification
//!   order is unspecified. Getters must be pure with respect to the graph.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::{ReactiveError, Result};
use crate::value::Value;

use super::object::{ObjectInner, ReactiveObject};

/// Getter: `(receiver, field name, previous cache) -> new value`.
pub type Getter = dyn Fn(&ReactiveObject, &str, &Value) -> Value;

/// Setter: `(field name, incoming value, previous cache) -> value to store`.
pub type Setter = dyn Fn(&str, Value, &Value) -> Value;

/// Where a descriptor currently lives.
struct Home {
    object: Weak<ObjectInner>,
    field: String,
}

/// A binding this descriptor registered in some object's table.
pub(crate) struct Registration {
    pub(crate) object: Weak<ObjectInner>,
    pub(crate) key: String,
}

/// Shared interior for [`ComputedField`].
struct ComputedInner {
    paths: Vec<String>,
    getter: Rc<Getter>,
    setter: Option<Rc<Setter>>,
    cache: RefCell<Value>,
    dirty: Cell<bool>,
    volatile: Cell<bool>,
    version: Cell<u64>,
    home: RefCell<Option<Home>>,
    registrations: RefCell<Vec<Registration>>,
}

/// A derived value declared with explicit dependency paths.
///
/// Cloning a `ComputedField` creates a new handle to the **same** state: one
/// cache, one dirty flag. A descriptor is meant to live in one slot; assigning
/// clones to several slots moves its home to the last one indexed.
pub struct ComputedField {
    inner: Rc<ComputedInner>,
}

impl Clone for ComputedField {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for ComputedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedField")
            .field("paths", &self.inner.paths)
            .field("cached", &self.inner.cache.borrow())
            .field("dirty", &self.inner.dirty.get())
            .field("volatile", &self.inner.volatile.get())
            .field("read_only", &self.is_read_only())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl ComputedField {
    /// Declare a read-only computed field.
    pub fn new<P, S>(
        paths: P,
        getter: impl Fn(&ReactiveObject, &str, &Value) -> Value + 'static,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(paths, Rc::new(getter), None)
    }

    /// Declare a computed field that also accepts writes.
    ///
    /// The setter's return value becomes the cache; the field is clean until
    /// one of its dependencies changes.
    pub fn with_setter<P, S>(
        paths: P,
        getter: impl Fn(&ReactiveObject, &str, &Value) -> Value + 'static,
        setter: impl Fn(&str, Value, &Value) -> Value + 'static,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(paths, Rc::new(getter), Some(Rc::new(setter)))
    }

    /// Read-only field whose getter always yields [`Value::Null`].
    pub fn constant<P, S>(paths: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(paths, |_, _, _| Value::Null)
    }

    fn build<P, S>(paths: P, getter: Rc<Getter>, setter: Option<Rc<Setter>>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Rc::new(ComputedInner {
                paths: paths.into_iter().map(Into::into).collect(),
                getter,
                setter,
                cache: RefCell::new(Value::Null),
                dirty: Cell::new(true),
                volatile: Cell::new(false),
                version: Cell::new(0),
                home: RefCell::new(None),
                registrations: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Recompute on every read, bypassing the cache.
    #[must_use]
    pub fn volatile(self) -> Self {
        self.inner.volatile.set(true);
        self
    }

    #[must_use]
    pub fn is_volatile(&self) -> bool {
        self.inner.volatile.get()
    }

    /// True iff no setter was supplied.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.inner.setter.is_none()
    }

    /// Whether the cached value is stale.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// The last computed (or set) value, without refreshing it.
    #[must_use]
    pub fn cached(&self) -> Value {
        self.inner.cache.borrow().clone()
    }

    #[must_use]
    pub fn dependency_paths(&self) -> &[String] {
        &self.inner.paths
    }

    /// Number of getter invocations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Force invalidation. Dependents of this field are invalidated too.
    pub fn invalidate(&self) {
        super::notify::mark_dirty(self);
    }

    /// Whether both handles share the same state.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Return the cached value, calling the getter first if the field is
    /// dirty or volatile.
    pub(crate) fn evaluate(&self, receiver: &ReactiveObject, name: &str) -> Value {
        if self.inner.dirty.get() || self.inner.volatile.get() {
            let previous = self.inner.cache.borrow().clone();
            let getter = Rc::clone(&self.inner.getter);
            let next = getter(receiver, name, &previous);
            *self.inner.cache.borrow_mut() = next;
            self.inner.dirty.set(false);
            self.inner.version.set(self.inner.version.get() + 1);
            tracing::trace!(
                message = "computed.recompute",
                field = name,
                version = self.inner.version.get()
            );
        } else {
            tracing::trace!(message = "computed.cache_hit", field = name);
        }
        self.inner.cache.borrow().clone()
    }

    /// Route a write through the setter.
    pub(crate) fn assign(&self, name: &str, value: Value) -> Result<()> {
        let Some(setter) = self.inner.setter.clone() else {
            tracing::warn!(message = "computed.read_only_write", field = name);
            return Err(ReactiveError::read_only(name));
        };
        let previous = self.inner.cache.borrow().clone();
        let next = setter(name, value, &previous);
        *self.inner.cache.borrow_mut() = next;
        self.inner.dirty.set(false);
        Ok(())
    }

    /// Set the dirty flag. Returns true on a clean-to-dirty transition.
    pub(crate) fn set_dirty(&self) -> bool {
        !self.inner.dirty.replace(true)
    }

    pub(crate) fn set_home(&self, object: &ReactiveObject, field: &str) {
        *self.inner.home.borrow_mut() = Some(Home {
            object: object.downgrade(),
            field: field.to_owned(),
        });
    }

    pub(crate) fn clear_home(&self) {
        self.inner.home.borrow_mut().take();
    }

    /// The live object and field name this descriptor is assigned to.
    pub(crate) fn home(&self) -> Option<(ReactiveObject, String)> {
        let home = self.inner.home.borrow();
        let home = home.as_ref()?;
        let object = ReactiveObject::upgrade(&home.object)?;
        Some((object, home.field.clone()))
    }

    /// Remember a binding registered in `object`'s table under `key`.
    ///
    /// Registrations on objects that have been dropped are discarded first,
    /// so the list stays bounded when bindings only accumulate.
    pub(crate) fn record_registration(&self, object: &ReactiveObject, key: &str) {
        let mut registrations = self.inner.registrations.borrow_mut();
        registrations.retain(|r| r.object.strong_count() > 0);
        registrations.push(Registration {
            object: object.downgrade(),
            key: key.to_owned(),
        });
    }

    #[cfg(test)]
    pub(crate) fn registration_count(&self) -> usize {
        self.inner.registrations.borrow().len()
    }

    pub(crate) fn take_registrations(&self) -> Vec<Registration> {
        std::mem::take(&mut *self.inner.registrations.borrow_mut())
    }

    pub(crate) fn downgrade(&self) -> WeakComputed {
        WeakComputed(Rc::downgrade(&self.inner))
    }
}

/// Non-owning handle stored in binding tables.
#[derive(Clone)]
pub(crate) struct WeakComputed(Weak<ComputedInner>);

impl WeakComputed {
    pub(crate) fn upgrade(&self) -> Option<ComputedField> {
        self.0.upgrade().map(|inner| ComputedField { inner })
    }

    pub(crate) fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub(crate) fn points_to(&self, field: &ComputedField) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&field.inner))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
