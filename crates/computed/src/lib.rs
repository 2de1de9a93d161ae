#![forbid(unsafe_code)]

//! Reactive computed properties over plain data objects.
//!
//! Wrap a mapping with [`wrap`], declare derived fields with [`property`] or
//! [`property_with_setter`], and read and write through the returned
//! [`ReactiveObject`]:
//!
//! ```
//! use computed::prelude::*;
//!
//! let person = computed::wrap([
//!     ("lastName", Slot::from("Robinson Young")),
//!     (
//!         "fullName",
//!         Slot::from(computed::property(["firstName", "lastName"], |p, _, _| {
//!             Value::from(format!("{} {}", p.get("firstName"), p.get("lastName")))
//!         })),
//!     ),
//! ]);
//!
//! person.set("firstName", "Kyle").unwrap();
//! assert_eq!(person.get("fullName").as_str(), Some("Kyle Robinson Young"));
//! ```

pub use computed_core::{
    ComputedField, ReactiveArray, ReactiveConfig, ReactiveError, ReactiveObject, Result, Slot,
    Value,
};

/// Wrap a plain mapping into a [`ReactiveObject`].
pub fn wrap<I, K, S>(fields: I) -> ReactiveObject
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<Slot>,
{
    ReactiveObject::wrap(fields)
}

/// [`wrap`] with an explicit configuration.
pub fn wrap_with<I, K, S>(config: ReactiveConfig, fields: I) -> ReactiveObject
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: Into<Slot>,
{
    ReactiveObject::wrap_with(config, fields)
}

/// Declare a read-only computed field over `paths`.
pub fn property<P, S>(
    paths: P,
    get: impl Fn(&ReactiveObject, &str, &Value) -> Value + 'static,
) -> ComputedField
where
    P: IntoIterator<Item = S>,
    S: Into<String>,
{
    ComputedField::new(paths, get)
}

/// Declare a writable computed field over `paths`.
pub fn property_with_setter<P, S>(
    paths: P,
    get: impl Fn(&ReactiveObject, &str, &Value) -> Value + 'static,
    set: impl Fn(&str, Value, &Value) -> Value + 'static,
) -> ComputedField
where
    P: IntoIterator<Item = S>,
    S: Into<String>,
{
    ComputedField::with_setter(paths, get, set)
}

pub mod prelude {
    pub use crate::{property, property_with_setter, wrap, wrap_with};
    pub use computed_core::reactive::notify;
    pub use computed_core::{
        ComputedField, ReactiveArray, ReactiveConfig, ReactiveError, ReactiveObject, Slot, Value,
    };
}
