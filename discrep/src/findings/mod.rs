//! Findings emitted by rules and the store that collects them.
//!
//! A [`Finding`] carries the locator of the flagged object and zero or more
//! classification keys, outermost first. The report builder groups on those
//! keys, one nesting level per key.
//!
//! Rules that prefer flat strings can emit the packed form handled by
//! [`codec`] (`key1$key2#locator`); those entries are decoded when the
//! report is built.

pub mod codec;
mod store;

#[cfg(test)]
mod tests;

use serde::{
    Deserialize,
    Serialize,
};
pub use store::{
    FindingSink,
    FindingStore,
    StoredFinding,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub class_keys: Vec<String>,
    pub locator:    String,
}

impl Finding {
    /// An ungrouped finding.
    pub fn new<S: Into<String>>(locator: S) -> Self {
        Self {
            class_keys: Vec::new(),
            locator:    locator.into(),
        }
    }

    pub fn keyed<K, S>(
        keys: impl IntoIterator<Item = K>,
        locator: S,
    ) -> Self
    where
        K: Into<String>,
        S: Into<String>, {
        Self {
            class_keys: keys.into_iter().map(Into::into).collect(),
            locator:    locator.into(),
        }
    }

    /// Appends one more (inner) classification key.
    pub fn with_key<K: Into<String>>(
        mut self,
        key: K,
    ) -> Self {
        self.class_keys.push(key.into());
        self
    }

    pub fn depth(&self) -> usize {
        self.class_keys.len()
    }
}
