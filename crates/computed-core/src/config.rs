#![forbid(unsafe_code)]

//! Per-object configuration for dependency indexing.

/// Configuration applied to a wrapped object and to every computed field
/// whose home is that object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactiveConfig {
    /// Evict a computed field's previous bindings before re-indexing it.
    ///
    /// When false, re-indexing only adds bindings, and bindings left on
    /// replaced nested objects keep dirtying their computed field (harmless,
    /// but it costs an extra recompute).
    /// Default: true.
    pub strict_bindings: bool,

    /// Path segments that mean "every element of this sequence".
    /// Default: `["[]", "@each"]`.
    pub wildcard_markers: Vec<String>,

    /// Re-index bound computed fields when a slot holding an object or list
    /// is replaced, and after every array mutation.
    /// Default: true.
    pub reindex_on_replace: bool,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            strict_bindings: true,
            wildcard_markers: vec!["[]".to_owned(), "@each".to_owned()],
            reindex_on_replace: true,
        }
    }
}

impl ReactiveConfig {
    #[must_use]
    pub fn strict_bindings(mut self, strict: bool) -> Self {
        self.strict_bindings = strict;
        self
    }

    #[must_use]
    pub fn reindex_on_replace(mut self, enabled: bool) -> Self {
        self.reindex_on_replace = enabled;
        self
    }

    #[must_use]
    pub fn wildcard_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wildcard_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_wildcard(&self, segment: &str) -> bool {
        self.wildcard_markers.iter().any(|m| m == segment)
    }
}
