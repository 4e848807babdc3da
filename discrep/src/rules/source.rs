//! Checks over the population of source descriptors.

use hashbrown::HashMap;
use indexmap::IndexSet;
use itertools::Itertools;
use log::warn;

use crate::data_structs::tree::{
    Descriptor,
    NodeId,
};
use crate::engine::{
    FamilyPass,
    RuleFamily,
    RuleInfo,
    RuleScope,
    ScanContext,
    TaxonRecord,
    ONCALLER,
};
use crate::error::DiscrepResult;
use crate::findings::{
    Finding,
    FindingSink,
};
use crate::report::fatal::SOURCE_QUALS;
use crate::tools::distribution::{
    classify,
    classify_member,
};

pub const DISC_SOURCE_QUALS: RuleInfo = RuleInfo::new(
    SOURCE_QUALS,
    "Source Qualifier test for Asndisc",
    "Source Qualifier Report",
    RuleScope::Entry,
)
.with_family(RuleFamily::SourceQuals);

pub const ONCALLER_MULTISRC: RuleInfo = RuleInfo::new(
    "ONCALLER_MULTISRC",
    "Comma or semicolon appears in strain or isolate",
    "[n] organism[s] [has] multiple strain or isolate values.",
    RuleScope::Entry,
)
.with_kinds(ONCALLER)
.with_family(RuleFamily::SourceQuals);

/// Source descriptors of the whole tree, in depth-first order.
pub fn sources<'a>(ctx: &ScanContext<'a>) -> Vec<(NodeId, &'a Descriptor)> {
    let tree = ctx.tree;
    tree.all_descriptors()
        .into_iter()
        .filter_map(|id| tree.descriptor(id).map(|d| (id, d)))
        .filter(|(_, d)| d.is_source())
        .collect()
}

/// Classifies every qualifier seen on any source descriptor.
///
/// Groups are keyed `"{qual} ({distribution})"`. Inside a group, members
/// missing the qualifier, members sharing a duplicated value and members
/// carrying several values get their own subgroups.
pub struct SourceQuals {
    members: [RuleInfo; 2],
}

impl Default for SourceQuals {
    fn default() -> Self {
        Self {
            members: [DISC_SOURCE_QUALS, ONCALLER_MULTISRC],
        }
    }
}

impl SourceQuals {
    fn report_qualifiers(
        ctx: &ScanContext<'_>,
        sources: &[(NodeId, &Descriptor)],
        sink: &mut FindingSink<'_>,
    ) {
        let quals: IndexSet<&str> = sources
            .iter()
            .flat_map(|(_, d)| d.qualifiers().keys())
            .collect();

        for qual in quals {
            let values = sources
                .iter()
                .map(|(_, d)| d.qualifiers().first(qual))
                .collect_vec();
            let Some(distribution) = classify(values.iter().copied())
            else {
                continue;
            };
            let group = format!("{} ({})", qual, distribution);
            let counts = values.iter().flatten().counts();

            for ((id, descriptor), value) in sources.iter().zip(values.iter()) {
                let locator = ctx.tree.locator(*id);
                let mut finding = Finding::keyed([group.as_str()], locator);
                match value {
                    None => finding = finding.with_key(format!("missing {}", qual)),
                    Some(value) if counts.get(value).is_some_and(|n| *n > 1) => {
                        finding = finding.with_key(format!("{} = {}", qual, value))
                    },
                    Some(_) => {},
                }
                sink.emit(DISC_SOURCE_QUALS.name, finding);

                let all = descriptor.qualifiers().get(qual).unwrap_or(&[]);
                if let Some(multi) = classify_member(all) {
                    sink.emit(
                        DISC_SOURCE_QUALS.name,
                        Finding::keyed(
                            [
                                group.clone(),
                                format!("[n] source[s] [has] multiple {} values, {}", qual, multi),
                            ],
                            locator,
                        ),
                    );
                }
            }
        }
    }

    fn report_multisource(
        ctx: &ScanContext<'_>,
        sources: &[(NodeId, &Descriptor)],
        sink: &mut FindingSink<'_>,
    ) {
        for (id, descriptor) in sources {
            let flagged = ["strain", "isolate"].iter().any(|qual| {
                let values = descriptor.qualifiers().get(qual).unwrap_or(&[]);
                values.len() > 1 || values.iter().any(|v| v.contains(&[',', ';'][..]))
            });
            if flagged {
                sink.emit(ONCALLER_MULTISRC.name, Finding::new(ctx.tree.locator(*id)));
            }
        }
    }
}

impl FamilyPass for SourceQuals {
    fn family(&self) -> RuleFamily {
        RuleFamily::SourceQuals
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
        let sources = sources(ctx);
        if sink.is_enabled(DISC_SOURCE_QUALS.name) {
            Self::report_qualifiers(ctx, &sources, sink);
        }
        if sink.is_enabled(ONCALLER_MULTISRC.name) {
            Self::report_multisource(ctx, &sources, sink);
        }
        Ok(())
    }
}

pub const TAX_LOOKUP_MISSING: RuleInfo = RuleInfo::new(
    "TAX_LOOKUP_MISSING",
    "Find Missing Tax Lookups",
    "[n] tax name[s] [is] missing in taxonomy lookup.",
    RuleScope::Entry,
)
.with_kinds(ONCALLER)
.with_family(RuleFamily::Taxonomy);

pub const TAX_LOOKUP_MISMATCH: RuleInfo = RuleInfo::new(
    "TAX_LOOKUP_MISMATCH",
    "Find Tax Lookup Mismatches",
    "[n] tax name[s] [does] not match taxonomy lookup.",
    RuleScope::Entry,
)
.with_kinds(ONCALLER)
.with_family(RuleFamily::Taxonomy);

pub const LOOKUP_UNAVAILABLE: &str = "[n] tax name[s] could not be looked up.";

/// Checks organism names against the injected taxonomy lookup, querying
/// each distinct name once.
///
/// A failing lookup never fails the rule: the affected descriptors are
/// reported under [`LOOKUP_UNAVAILABLE`] instead.
pub struct Taxonomy {
    members: [RuleInfo; 2],
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            members: [TAX_LOOKUP_MISSING, TAX_LOOKUP_MISMATCH],
        }
    }
}

impl FamilyPass for Taxonomy {
    fn family(&self) -> RuleFamily {
        RuleFamily::Taxonomy
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
        let mut answers: HashMap<&str, DiscrepResult<Option<TaxonRecord>>> = HashMap::new();

        for (id, descriptor) in sources(ctx) {
            let Some(taxname) = descriptor.taxname()
            else {
                continue;
            };
            let answer = answers
                .entry(taxname)
                .or_insert_with(|| ctx.lookup.lookup(taxname));
            let locator = ctx.tree.locator(id);

            match answer {
                Ok(None) => sink.emit(TAX_LOOKUP_MISSING.name, Finding::new(locator)),
                Ok(Some(record)) if record.taxname != taxname => {
                    sink.emit(TAX_LOOKUP_MISMATCH.name, Finding::new(locator))
                },
                Ok(Some(_)) => {},
                Err(err) => {
                    warn!("{}", err);
                    sink.emit(
                        TAX_LOOKUP_MISSING.name,
                        Finding::keyed([LOOKUP_UNAVAILABLE], locator),
                    );
                },
            }
        }
        Ok(())
    }
}
