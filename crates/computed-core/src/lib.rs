#![forbid(unsafe_code)]

//! Core: computed field descriptors, binding index, reactive object and array
//! proxies, and change notification.

pub mod config;
pub mod error;
pub mod reactive;
pub mod value;

pub use config::ReactiveConfig;
pub use error::{ReactiveError, Result};
pub use reactive::{ComputedField, ReactiveArray, ReactiveObject, Slot};
pub use value::Value;
