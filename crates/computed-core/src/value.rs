#![forbid(unsafe_code)]

//! Dynamic values held by reactive object slots.
//!
//! [`Value`] is the plain-data side of a slot: scalars, strings, sequences,
//! and handles to nested [`ReactiveObject`]s. Nested objects are reference
//! types (cloning a `Value::Object` clones the handle, not the object), while
//! lists are owned sequences that are only mutated in place through a
//! [`ReactiveArray`](crate::reactive::ReactiveArray).
//!
//! # Ordering
//!
//! [`Value::compare`] defines a total order used by the default array sort:
//!
//! ```text
//! Null < Bool < numbers (Int/Float, numeric) < Str < List < Object
//! ```
//!
//! Floats compare with `f64::total_cmp`; objects compare by address.

use std::cmp::Ordering;
use std::fmt;

use crate::reactive::ReactiveObject;

/// A dynamically typed value stored in (or read from) a reactive object.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent or explicitly empty value. Reads of missing fields return this.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An owned sequence. Elements may themselves be nested objects.
    List(Vec<Value>),
    /// A handle to a nested reactive object.
    Object(ReactiveObject),
}

impl Value {
    /// Whether this is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view. Integers are widened.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Whether the value can carry dependency edges (object or sequence).
    #[must_use]
    pub(crate) const fn is_structural(&self) -> bool {
        matches!(self, Self::List(_) | Self::Object(_))
    }

    /// Render the items of a list joined by `sep`.
    ///
    /// Non-list values render as their [`Display`](fmt::Display) form.
    #[must_use]
    pub fn join(&self, sep: &str) -> String {
        match self {
            Self::List(items) => join_items(items, sep),
            other => other.to_string(),
        }
    }

    /// Total order across all variants. See the module docs.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                let a = self.as_f64().unwrap_or_default();
                let b = other.as_f64().unwrap_or_default();
                a.total_cmp(&b)
            }
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    let ord = x.compare(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Self::Object(a), Self::Object(b)) => a.addr().cmp(&b.addr()),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Str(_) => 3,
            Self::List(_) => 4,
            Self::Object(_) => 5,
        }
    }
}

pub(crate) fn join_items(items: &[Value], sep: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(&item.to_string());
    }
    out
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => f.write_str(&join_items(items, ",")),
            Self::Object(_) => f.write_str("[object]"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<ReactiveObject> for Value {
    fn from(value: ReactiveObject) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_plain_rendering() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(34).to_string(), "34");
        assert_eq!(Value::from("Kyle").to_string(), "Kyle");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "a,b");
    }

    #[test]
    fn join_uses_separator() {
        let list = Value::from(vec!["one", "1 point 5", "two"]);
        assert_eq!(list.join(", "), "one, 1 point 5, two");
        assert_eq!(Value::from(7).join(", "), "7");
    }

    #[test]
    fn numbers_compare_across_variants() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_eq!(Value::Int(1).compare(&Value::Float(1.5)), Ordering::Less);
    }

    #[test]
    fn rank_orders_mixed_variants() {
        let mut values = vec![
            Value::from("b"),
            Value::Null,
            Value::from(3),
            Value::from(true),
            Value::from("a"),
        ];
        values.sort_by(Value::compare);
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(true),
                Value::from(3),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ReactiveObject::new();
        let b = ReactiveObject::new();
        assert_eq!(Value::from(a.clone()), Value::from(a));
        assert_ne!(Value::from(b), Value::from(ReactiveObject::new()));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some("x")).as_str(), Some("x"));
    }
}
