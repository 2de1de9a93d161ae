#![forbid(unsafe_code)]

//! Reactive objects with lazily recomputed, dependency-tracked fields.
//!
//! This module provides the dependency-tracking and invalidation engine:
//!
//! - [`ComputedField`]: a derived value declared over dependency paths, with
//!   a cache, a dirty flag, and optional setter and volatility.
//! - [`ReactiveObject`]: a field map whose reads resolve computed slots and
//!   whose writes index, re-index, and notify.
//! - [`ReactiveArray`]: a proxy over a list-valued field; mutators notify the
//!   owning field.
//! - [`notify`]: the change notification dispatcher.
//!
//! # Architecture
//!
//! Objects and descriptors use `Rc` with interior mutability for
//! single-threaded shared ownership. Each object owns a binding table mapping
//! keys to weak descriptor handles; each descriptor remembers its home slot
//! and where it registered, so its bindings can be rebuilt when the object
//! graph changes shape.
//!
//! # Invariants
//!
//! 1. A clean, non-volatile computed field returns its cache without calling
//!    its getter.
//! 2. Writing a key dirties exactly the computed fields bound to it, plus
//!    (transitively) fields bound to those fields' names.
//! 3. Bindings for a key fire in registration order.
//! 4. Bindings to dropped descriptors never fire and are pruned on dispatch.

pub mod array;
pub(crate) mod binding;
pub mod computed;
pub mod notify;
pub mod object;

pub use array::ReactiveArray;
pub use computed::{ComputedField, Getter, Setter};
pub use notify::notify;
pub use object::{ReactiveObject, Slot};
