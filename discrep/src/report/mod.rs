//! Report trees built from the finding store.
//!
//! Every enabled rule yields one top-level [`ReportItem`]. Findings are
//! grouped on their classification keys, one nesting level per key, in the
//! order the keys were first seen. An item's locators are the deduplicated
//! union of everything below it, so a locator filed under two sibling
//! groups is listed under both but counted once by the parent.

mod builder;
pub mod fatal;
mod render;
pub mod template;


pub use builder::ReportBuilder;
pub use render::{
    write_json,
    TextRenderer,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// The rule ran and found nothing.
    #[default]
    Clean,
    Flagged,
    /// The rule did not complete or emitted undecodable findings.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportItem {
    pub setting_name:  String,
    /// Grouping key of a subcategory; `None` on the top-level item.
    pub key:           Option<String>,
    pub description:   String,
    pub status:        ItemStatus,
    pub fatal:         bool,
    pub locators:      Vec<String>,
    pub subcategories: Vec<ReportItem>,
    pub errors:        Vec<String>,
}

impl ReportItem {
    /// Number of distinct flagged objects in this subtree.
    pub fn count(&self) -> usize {
        self.locators.len()
    }

    pub fn is_clean(&self) -> bool {
        self.status == ItemStatus::Clean
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Finds a direct subcategory by key.
    pub fn subcategory(
        &self,
        key: &str,
    ) -> Option<&ReportItem> {
        self.subcategories
            .iter()
            .find(|item| item.key.as_deref() == Some(key))
    }

    /// Whether this item or any subcategory is fatal.
    pub fn any_fatal(&self) -> bool {
        self.fatal || self.subcategories.iter().any(ReportItem::any_fatal)
    }
}
