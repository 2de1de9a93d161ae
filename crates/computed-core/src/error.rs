#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReactiveError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// A write hit a computed field that was declared without a setter.
    #[error("{field} is read only. Supply a set function to make this property settable.")]
    ReadOnly { field: String },

    #[error("{field} no longer holds a list")]
    NotAList { field: String },

    #[error("index {index} is out of bounds for {field} (len {len})")]
    IndexOutOfBounds {
        field: String,
        index: usize,
        len: usize,
    },
}

impl ReactiveError {
    #[must_use]
    pub fn read_only(field: impl Into<String>) -> Self {
        Self::ReadOnly {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn not_a_list(field: impl Into<String>) -> Self {
        Self::NotAList {
            field: field.into(),
        }
    }

    /// The field name the error refers to.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::ReadOnly { field }
            | Self::NotAList { field }
            | Self::IndexOutOfBounds { field, .. } => field,
        }
    }
}
