use indexmap::IndexSet;
use itertools::Itertools;
use multimap::MultiMap;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::data_structs::tree::{
    Annotation,
    NodeId,
};
use crate::data_structs::FeatureKind;
use crate::engine::{
    FamilyPass,
    RuleFamily,
    RuleInfo,
    RuleScope,
    ScanContext,
};
use crate::findings::{
    Finding,
    FindingSink,
};

pub const MISSING_LOCUS_TAGS: RuleInfo = RuleInfo::new(
    "MISSING_LOCUS_TAGS",
    "Missing Locus Tags",
    "[n] gene[s] [has] no locus tag[s].",
    RuleScope::Entry,
)
.with_family(RuleFamily::LocusTags);

pub const DUPLICATE_LOCUS_TAGS: RuleInfo = RuleInfo::new(
    "DUPLICATE_LOCUS_TAGS",
    "Duplicate Locus Tags",
    "[n] gene[s] [has] duplicate locus tags.",
    RuleScope::Entry,
)
.with_family(RuleFamily::LocusTags);

pub const INCONSISTENT_LOCUS_TAG_PREFIX: RuleInfo = RuleInfo::new(
    "INCONSISTENT_LOCUS_TAG_PREFIX",
    "Inconsistent Locus Tag Prefix",
    "[n] feature[s] [has] inconsistent locus tag prefixes.",
    RuleScope::Entry,
)
.with_family(RuleFamily::LocusTags);

pub const BAD_LOCUS_TAG_FORMAT: RuleInfo = RuleInfo::new(
    "BAD_LOCUS_TAG_FORMAT",
    "Bad Locus Tag Format",
    "[n] locus tag[s] [is] incorrectly formatted.",
    RuleScope::Entry,
)
.with_family(RuleFamily::LocusTags);

/// Prefix of at least three alphanumerics starting with a letter, an
/// underscore, then a non-empty alphanumeric suffix.
static LOCUS_TAG_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9]{2,}_[A-Za-z0-9]+$").expect("valid locus tag pattern")
});

pub fn is_well_formed(tag: &str) -> bool {
    LOCUS_TAG_FORMAT.is_match(tag)
}

/// Part of a locus tag before the first underscore.
pub fn prefix(tag: &str) -> &str {
    tag.split_once('_')
        .map(|(prefix, _)| prefix)
        .unwrap_or(tag)
}

/// Gene locus tags across every record of the tree.
///
/// Inconsistent prefixes are stored in packed form, keyed by prefix; a
/// prefix holding a reserved delimiter surfaces as an encoding violation on
/// that rule alone.
pub struct LocusTags {
    members: [RuleInfo; 4],
}

impl Default for LocusTags {
    fn default() -> Self {
        Self {
            members: [
                MISSING_LOCUS_TAGS,
                DUPLICATE_LOCUS_TAGS,
                INCONSISTENT_LOCUS_TAG_PREFIX,
                BAD_LOCUS_TAG_FORMAT,
            ],
        }
    }
}

impl FamilyPass for LocusTags {
    fn family(&self) -> RuleFamily {
        RuleFamily::LocusTags
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Entry
    }

    fn members(&self) -> &[RuleInfo] {
        &self.members
    }

    fn run_entry(
        &self,
        ctx: &ScanContext<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let tree = ctx.tree;
        let genes: Vec<(NodeId, &Annotation)> = tree
            .records()
            .iter()
            .flat_map(|scope| tree.annotations_of(scope.id))
            .filter(|(_, a)| *a.kind() == FeatureKind::Gene)
            .collect();

        let mut by_tag: MultiMap<&str, NodeId> = MultiMap::new();
        let mut prefixes: IndexSet<&str> = IndexSet::new();

        for (id, gene) in genes.iter() {
            match gene.qualifiers().first("locus_tag") {
                None => {
                    sink.emit(MISSING_LOCUS_TAGS.name, Finding::new(tree.locator(*id)));
                },
                Some(tag) => {
                    by_tag.insert(tag, *id);
                    prefixes.insert(prefix(tag));
                    if !is_well_formed(tag) {
                        sink.emit(BAD_LOCUS_TAG_FORMAT.name, Finding::new(tree.locator(*id)));
                    }
                },
            }
        }

        let duplicated = genes
            .iter()
            .filter_map(|(_, gene)| gene.qualifiers().first("locus_tag"))
            .filter(|tag| by_tag.get_vec(tag).is_some_and(|ids| ids.len() > 1))
            .unique()
            .collect_vec();
        for tag in duplicated {
            for id in by_tag.get_vec(tag).into_iter().flatten() {
                sink.emit(
                    DUPLICATE_LOCUS_TAGS.name,
                    Finding::keyed([tag], tree.locator(*id)),
                );
            }
        }

        if prefixes.len() > 1 {
            for (id, gene) in genes.iter() {
                let Some(tag) = gene.qualifiers().first("locus_tag")
                else {
                    continue;
                };
                sink.emit_encoded(
                    INCONSISTENT_LOCUS_TAG_PREFIX.name,
                    &Finding::keyed(
                        [format!("[n] feature[s] [has] locus tag prefix {}", prefix(tag))],
                        tree.locator(*id),
                    ),
                );
            }
        }
        Ok(())
    }
}
