//! Checks over the feature layout of one record.

use std::cmp::Reverse;

use itertools::Itertools;

use crate::data_structs::tree::{
    Annotation,
    NodeId,
};
use crate::data_structs::typedef::PosType;
use crate::data_structs::FeatureKind;
use crate::engine::{
    RecordView,
    Rule,
    RuleInfo,
    RuleScope,
    ScanContext,
    ONCALLER,
};
use crate::findings::{
    Finding,
    FindingSink,
};
use crate::tools::compare::{
    adjacent,
    compare,
    strands_compatible,
    Relation,
};

pub const CONTAINED_SAME_STRAND: &str =
    "[n] coding region[s] completely contained in another coding region on the same strand.";
pub const CONTAINED_OPPOSITE_STRAND: &str =
    "[n] coding region[s] completely contained in another coding region, but on the opposite strand.";
pub const CONTAINED_WITH_NOTE: &str =
    "[n] coding region[s] completely contained in another coding region but have note.";

/// Coding regions lying entirely inside another coding region.
///
/// Both members of a pair are reported, grouped by whether the pair shares
/// a strand and whether either carries a note.
pub struct ContainedCds;

impl ContainedCds {
    pub const INFO: RuleInfo = RuleInfo::new(
        "CONTAINED_CDS",
        "Contained CDS",
        "[n] coding region[s] completely contained in another coding region.",
        RuleScope::Record,
    );
}

impl Rule for ContainedCds {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let cds = view.of_kind(&FeatureKind::Cds);

        for ((id_a, a), (id_b, b)) in cds.iter().tuple_combinations() {
            let (outer, inner) = match compare(a.location(), b.location()) {
                Relation::Contains | Relation::Same => ((id_a, a), (id_b, b)),
                Relation::ContainedBy => ((id_b, b), (id_a, a)),
                _ => continue,
            };
            let key = if outer.1.comment().is_some() || inner.1.comment().is_some() {
                CONTAINED_WITH_NOTE
            }
            else if strands_compatible(a.location(), b.location()) {
                CONTAINED_SAME_STRAND
            }
            else {
                CONTAINED_OPPOSITE_STRAND
            };
            for id in [inner.0, outer.0] {
                sink.emit(
                    Self::INFO.name,
                    Finding::keyed([key], view.locator(*id)),
                );
            }
        }
        Ok(())
    }
}

/// Exons and introns of a gene must tile it without gaps or overlaps.
/// Two introns in a row lack the exon between them and are both flagged.
/// Consecutive exons may leave a gap for an unannotated intron but must not
/// overlap. Trans-spliced genes are skipped.
pub struct ExonIntronConflict;

impl ExonIntronConflict {
    pub const INFO: RuleInfo = RuleInfo::new(
        "DISC_EXON_INTRON_CONFLICT",
        "Exon and intron locations should abut (unless gene is trans-spliced)",
        "[n] introns and exons are incorrectly positioned.",
        RuleScope::Record,
    );
}

fn within<'a>(
    gene: &Annotation,
    features: &[(NodeId, &'a Annotation)],
) -> Vec<(NodeId, &'a Annotation)> {
    features
        .iter()
        .filter(|(_, f)| {
            matches!(
                compare(gene.location(), f.location()),
                Relation::Same | Relation::Contains
            ) && strands_compatible(gene.location(), f.location())
        })
        .copied()
        .collect()
}

impl Rule for ExonIntronConflict {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let exons = view.of_kind(&FeatureKind::Exon);
        let introns = view.of_kind(&FeatureKind::Intron);
        if exons.is_empty() || introns.is_empty() {
            return Ok(());
        }

        for (_, gene) in view.of_kind(&FeatureKind::Gene) {
            if gene.qualifiers().contains("trans_splicing") {
                continue;
            }
            let strand = gene.location().strand();
            let gene_introns = within(gene, &introns);
            if gene_introns.is_empty() {
                continue;
            }
            let mut parts = within(gene, &exons);
            parts.extend(gene_introns);

            let five_prime = |a: &Annotation| a.location().five_prime().unwrap_or_default();
            if strand.is_minus() {
                parts.sort_by_key(|(_, a)| Reverse(five_prime(*a)));
            }
            else {
                parts.sort_by_key(|(_, a)| five_prime(*a));
            }

            for ((id_a, a), (id_b, b)) in parts.iter().tuple_windows() {
                let conflict = match (a.kind(), b.kind()) {
                    (FeatureKind::Intron, FeatureKind::Intron) => true,
                    (FeatureKind::Exon, FeatureKind::Exon) => {
                        compare(a.location(), b.location()).shares_bases()
                    },
                    _ => !adjacent(a.location(), b.location(), strand),
                };
                if conflict {
                    sink.emit(Self::INFO.name, Finding::new(view.locator(*id_a)));
                    sink.emit(Self::INFO.name, Finding::new(view.locator(*id_b)));
                }
            }
        }
        Ok(())
    }
}

/// Introns, annotated or implied by gaps between coding intervals, shorter
/// than `short_intron_len`.
pub struct ShortIntron;

impl ShortIntron {
    pub const INFO: RuleInfo = RuleInfo::new(
        "DISC_SHORT_INTRON",
        "Introns shorter than 10 nt",
        "[n] intron[s] [is] shorter than the minimum intron length.",
        RuleScope::Record,
    );
}

impl Rule for ShortIntron {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let min_len: PosType = ctx.config.short_intron_len;

        for (id, annotation) in view.annotations() {
            let short = match annotation.kind() {
                FeatureKind::Intron => annotation.location().total_length() < min_len,
                FeatureKind::Cds if !annotation.is_pseudo() => {
                    annotation.location().gaps().any(|gap| gap < min_len)
                },
                _ => false,
            };
            if short {
                sink.emit(Self::INFO.name, Finding::new(view.locator(id)));
            }
        }
        Ok(())
    }
}

/// Feature counts by type, then by record.
pub struct FeatureCount;

impl FeatureCount {
    pub const INFO: RuleInfo = RuleInfo::new(
        "DISC_FEATURE_COUNT",
        "Count features present or missing from sequences",
        "[n] feature[s] [is] present.",
        RuleScope::Record,
    )
    .with_kinds(ONCALLER);
}

impl Rule for FeatureCount {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        for (id, annotation) in view.annotations() {
            if *annotation.kind() == FeatureKind::Source {
                continue;
            }
            let kind = annotation.kind();
            sink.emit(
                Self::INFO.name,
                Finding::keyed(
                    [
                        format!("{}: [n] present", kind),
                        format!("{}: [n] {} feature[s]", view.id(), kind),
                    ],
                    view.locator(id),
                ),
            );
        }
        Ok(())
    }
}
