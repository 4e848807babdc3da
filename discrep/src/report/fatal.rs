//! Discrepancies that block a submission.
//!
//! Fatal items are flagged and their description prefixed with
//! [`FATAL_PREFIX`]; the tag carries down into subcategories that satisfy
//! the same policy.

use super::ReportItem;

pub const FATAL_PREFIX: &str = "FATAL: ";

pub const SOURCE_QUALS: &str = "DISC_SOURCE_QUALS_ASNDISC";

/// Qualifiers whose source-qualifier groups may be fatal.
pub const FATAL_SOURCE_QUALS: [&str; 6] = [
    "collection-date",
    "country",
    "isolation-source",
    "host",
    "strain",
    "taxname",
];

#[derive(Debug, Clone, Copy)]
pub struct FatalPolicy {
    pub rule:     &'static str,
    /// Text the description must contain, if any.
    pub required: Option<&'static str>,
    /// Text that exempts a description, if any.
    pub exempt:   Option<&'static str>,
}

impl FatalPolicy {
    const fn always(rule: &'static str) -> Self {
        Self {
            rule,
            required: None,
            exempt: None,
        }
    }

    pub fn matches(
        &self,
        item: &ReportItem,
    ) -> bool {
        item.setting_name == self.rule
            && self
                .required
                .map_or(true, |text| item.description.contains(text))
            && !self
                .exempt
                .is_some_and(|text| item.description.contains(text))
    }
}

pub const POLICIES: &[FatalPolicy] = &[
    FatalPolicy::always("BAD_LOCUS_TAG_FORMAT"),
    FatalPolicy {
        rule:     "CONTAINED_CDS",
        required: None,
        exempt:   Some("but have note"),
    },
    FatalPolicy::always("INCONSISTENT_LOCUS_TAG_PREFIX"),
    FatalPolicy::always("MISSING_GENES"),
    FatalPolicy::always("MISSING_LOCUS_TAGS"),
    FatalPolicy::always("PARTIAL_CDS_COMPLETE_SEQUENCE"),
];

fn mark(
    item: &mut ReportItem,
    policy: &FatalPolicy,
) {
    item.fatal = true;
    item.description.insert_str(0, FATAL_PREFIX);
    for child in item.subcategories.iter_mut() {
        if policy.matches(child) {
            mark(child, policy);
        }
    }
}

/// Whether a source-qualifier group keyed `"{qual} ({distribution})"` is
/// fatal. A unique organism name per sequence only matters when there is
/// more than one nucleotide sequence.
pub fn source_qual_is_fatal(
    key: &str,
    nucleotides: usize,
) -> bool {
    let Some((qual, distribution)) = key.split_once(" (")
    else {
        return false;
    };
    if !FATAL_SOURCE_QUALS.contains(&qual) {
        return false;
    }
    distribution.contains("some missing")
        || distribution.contains("some duplicate")
        || (qual == "taxname"
            && distribution.starts_with("all present, all unique")
            && nucleotides > 1)
}

/// Tags fatal items in place.
pub fn apply(items: &mut [ReportItem]) {
    let nucleotides = items
        .iter()
        .find(|item| item.setting_name == "COUNT_NUCLEOTIDES")
        .map(ReportItem::count)
        .unwrap_or(0);

    for item in items.iter_mut() {
        if item.locators.is_empty() {
            continue;
        }
        if item.setting_name == SOURCE_QUALS {
            for child in item.subcategories.iter_mut() {
                let fatal = child
                    .key
                    .as_deref()
                    .is_some_and(|key| source_qual_is_fatal(key, nucleotides));
                if fatal {
                    child.fatal = true;
                    child.description.insert_str(0, FATAL_PREFIX);
                }
            }
            continue;
        }
        if let Some(policy) = POLICIES.iter().find(|p| p.matches(item)) {
            mark(item, policy);
        }
    }
}
