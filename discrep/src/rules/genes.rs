//! Gene layout and gene association checks.
//!
//! Both families compute their members from one pass over a record: the
//! pair scan sorts genes once, the association pass resolves every
//! gene-requiring feature once.

use itertools::Itertools;

use crate::data_structs::tree::{
    Annotation,
    NodeId,
};
use crate::data_structs::FeatureKind;
use crate::engine::{
    FamilyPass,
    RecordView,
    RuleFamily,
    RuleInfo,
    RuleScope,
    ScanContext,
};
use crate::findings::{
    Finding,
    FindingSink,
};
use crate::tools::association::{
    Association,
    AssociationResolver,
};
use crate::tools::compare::{
    compare,
    shares_endpoint,
    strands_compatible,
    Relation,
};

pub const OVERLAPPING_GENES: RuleInfo = RuleInfo::new(
    "OVERLAPPING_GENES",
    "Overlapping Genes",
    "[n] gene[s] overlap[S] another gene on the same strand.",
    RuleScope::Record,
)
.with_family(RuleFamily::GenePairs);

pub const FIND_OVERLAPPED_GENES: RuleInfo = RuleInfo::new(
    "FIND_OVERLAPPED_GENES",
    "Find Overlapped Genes",
    "[n] gene[s] completely overlapped by other genes.",
    RuleScope::Record,
)
.with_family(RuleFamily::GenePairs);

/// Pairwise gene overlaps within one record.
pub struct GenePairs {
    members: [RuleInfo; 2],
}

impl Default for GenePairs {
    fn default() -> Self {
        Self {
            members: [OVERLAPPING_GENES, FIND_OVERLAPPED_GENES],
        }
    }
}

impl FamilyPass for GenePairs {
    fn family(&self) -> RuleFamily {
        RuleFamily::GenePairs
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Record
    }

    fn members(&self) -> &[RuleInfo] {
        &self.members
    }

    fn run_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let genes = view
            .of_kind(&FeatureKind::Gene)
            .into_iter()
            .filter_map(|(id, gene)| gene.location().span().map(|span| (id, gene, span)))
            .sorted_by_key(|(_, _, span)| (span.start(), span.end()))
            .collect_vec();

        for (i, (id_a, a, span_a)) in genes.iter().enumerate() {
            for (id_b, b, span_b) in genes[i + 1..].iter() {
                if span_b.start() >= span_a.end() {
                    break;
                }
                if span_a.seqid() != span_b.seqid() {
                    continue;
                }
                match compare(a.location(), b.location()) {
                    Relation::Contains | Relation::Same => {
                        sink.emit(FIND_OVERLAPPED_GENES.name, Finding::new(view.locator(*id_b)));
                    },
                    Relation::ContainedBy => {
                        sink.emit(FIND_OVERLAPPED_GENES.name, Finding::new(view.locator(*id_a)));
                    },
                    Relation::Overlap | Relation::Mixed
                        if strands_compatible(a.location(), b.location()) =>
                    {
                        sink.emit(OVERLAPPING_GENES.name, Finding::new(view.locator(*id_a)));
                        sink.emit(OVERLAPPING_GENES.name, Finding::new(view.locator(*id_b)));
                    },
                    _ => {},
                }
            }
        }
        Ok(())
    }
}

pub const MISSING_GENES: RuleInfo = RuleInfo::new(
    "MISSING_GENES",
    "Missing Genes",
    "[n] feature[s] [has] no genes.",
    RuleScope::Record,
)
.with_family(RuleFamily::GeneAssociation);

pub const EXTRA_GENES: RuleInfo = RuleInfo::new(
    "EXTRA_GENES",
    "Extra Genes",
    "[n] gene feature[s] [is] not associated with a CDS or RNA feature.",
    RuleScope::Record,
)
.with_family(RuleFamily::GeneAssociation);

pub const DISC_BAD_GENE_STRAND: RuleInfo = RuleInfo::new(
    "DISC_BAD_GENE_STRAND",
    "Genes and features that share endpoints should be on the same strand",
    "[n] feature[s] [is] on a different strand from a gene sharing an endpoint.",
    RuleScope::Record,
)
.with_family(RuleFamily::GeneAssociation);

pub const DISC_GENE_PARTIAL_CONFLICT: RuleInfo = RuleInfo::new(
    "DISC_GENE_PARTIAL_CONFLICT",
    "Feature partialness should agree with gene partialness if endpoints match",
    "[n] feature location[s] conflict[S] with partialness of overlapping gene.",
    RuleScope::Record,
)
.with_family(RuleFamily::GeneAssociation);

pub const EXTRA_PSEUDO: &str = "[n] pseudo gene feature[s] [is] not associated with a CDS or RNA feature.";
pub const EXTRA_FRAMESHIFT: &str = "[n] non-pseudo gene feature[s] [is] not associated with a CDS or RNA feature and [has] frameshift in the comment.";
pub const EXTRA_OTHER: &str = "[n] non-pseudo gene feature[s] [is] not associated with a CDS or RNA feature and [does] not have frameshift in the comment.";

pub const CONFLICT_FIVE_PRIME: &str = "[n] feature[s] [has] partialness conflicting with the gene at the 5' end.";
pub const CONFLICT_THREE_PRIME: &str = "[n] feature[s] [has] partialness conflicting with the gene at the 3' end.";
pub const CONFLICT_BOTH: &str = "[n] feature[s] [has] partialness conflicting with the gene at both ends.";

/// Which ends of a feature disagree with its gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialConflict {
    FivePrime,
    ThreePrime,
    Both,
}

impl PartialConflict {
    fn key(self) -> &'static str {
        match self {
            PartialConflict::FivePrime => CONFLICT_FIVE_PRIME,
            PartialConflict::ThreePrime => CONFLICT_THREE_PRIME,
            PartialConflict::Both => CONFLICT_BOTH,
        }
    }
}

/// Compares the partial flags of a feature with those of its gene.
///
/// Where the ends coincide the flags must agree. Where the gene extends
/// past the feature, a partial gene end is a conflict unless a UTR of the
/// gene abuts the feature at that end.
pub fn partial_conflict(
    feature: &Annotation,
    gene: &Annotation,
    utrs: &[&Annotation],
) -> Option<PartialConflict> {
    let (f, g) = (feature.location(), gene.location());

    let five_prime = if f.five_prime() == g.five_prime() {
        f.partial_start() != g.partial_start()
    }
    else {
        let abuts_utr = utrs.iter().any(|utr| {
            *utr.kind() == FeatureKind::FivePrimeUtr
                && utr.location().three_prime() == f.five_prime()
        });
        f.partial_start() || (g.partial_start() && !abuts_utr)
    };
    let three_prime = if f.three_prime() == g.three_prime() {
        f.partial_stop() != g.partial_stop()
    }
    else {
        let abuts_utr = utrs.iter().any(|utr| {
            *utr.kind() == FeatureKind::ThreePrimeUtr
                && utr.location().five_prime() == f.three_prime()
        });
        f.partial_stop() || (g.partial_stop() && !abuts_utr)
    };

    match (five_prime, three_prime) {
        (true, true) => Some(PartialConflict::Both),
        (true, false) => Some(PartialConflict::FivePrime),
        (false, true) => Some(PartialConflict::ThreePrime),
        (false, false) => None,
    }
}

/// Resolves gene-requiring features to genes once per record and derives
/// missing, superfluous, strand and partialness findings from the result.
pub struct GeneAssociation {
    members: [RuleInfo; 4],
}

impl Default for GeneAssociation {
    fn default() -> Self {
        Self {
            members: [
                MISSING_GENES,
                EXTRA_GENES,
                DISC_BAD_GENE_STRAND,
                DISC_GENE_PARTIAL_CONFLICT,
            ],
        }
    }
}

impl GeneAssociation {
    fn extra_key(gene: &Annotation) -> &'static str {
        if gene.is_pseudo() {
            EXTRA_PSEUDO
        }
        else if gene
            .comment()
            .is_some_and(|c| c.to_lowercase().contains("frameshift"))
        {
            EXTRA_FRAMESHIFT
        }
        else {
            EXTRA_OTHER
        }
    }
}

impl FamilyPass for GeneAssociation {
    fn family(&self) -> RuleFamily {
        RuleFamily::GeneAssociation
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Record
    }

    fn members(&self) -> &[RuleInfo] {
        &self.members
    }

    fn run_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let (genes, gene_ids): (Vec<&Annotation>, Vec<NodeId>) = view
            .of_kind(&FeatureKind::Gene)
            .into_iter()
            .filter(|(_, gene)| !gene.location().is_empty())
            .map(|(id, gene)| (gene, id))
            .unzip();
        let (dependents, dependent_ids): (Vec<&Annotation>, Vec<NodeId>) = view
            .annotations()
            .filter(|(_, a)| a.kind().needs_gene())
            .map(|(id, a)| (a, id))
            .unzip();
        let utrs = view
            .annotations()
            .filter(|(_, a)| a.kind().is_utr())
            .map(|(_, a)| a)
            .collect_vec();

        let resolver = AssociationResolver::new(&genes);
        let resolution = resolver.resolve_all(&dependents);

        for idx in resolution.missing.iter() {
            sink.emit(MISSING_GENES.name, Finding::new(view.locator(dependent_ids[*idx])));
        }

        for idx in resolution.superfluous.iter() {
            if resolution.referenced.contains(idx) {
                continue;
            }
            sink.emit(
                EXTRA_GENES.name,
                Finding::keyed([Self::extra_key(genes[*idx])], view.locator(gene_ids[*idx])),
            );
        }

        for (gene_idx, gene) in genes.iter().enumerate() {
            for (dep_idx, dependent) in dependents.iter().enumerate() {
                if shares_endpoint(gene.location(), dependent.location())
                    && !strands_compatible(gene.location(), dependent.location())
                {
                    sink.emit(
                        DISC_BAD_GENE_STRAND.name,
                        Finding::new(view.locator(gene_ids[gene_idx])),
                    );
                    sink.emit(
                        DISC_BAD_GENE_STRAND.name,
                        Finding::new(view.locator(dependent_ids[dep_idx])),
                    );
                }
            }
        }

        for (dep_idx, association) in resolution.associations.iter().enumerate() {
            let gene_idx = match association {
                Association::Xref(idx) | Association::Positional(idx) => *idx,
                Association::Suppressed | Association::Missing => continue,
            };
            let gene = genes[gene_idx];
            let gene_utrs = utrs
                .iter()
                .copied()
                .filter(|utr| {
                    matches!(
                        compare(gene.location(), utr.location()),
                        Relation::Same | Relation::Contains
                    )
                })
                .collect_vec();
            if let Some(conflict) = partial_conflict(dependents[dep_idx], gene, &gene_utrs) {
                for locator in [
                    view.locator(dependent_ids[dep_idx]),
                    view.locator(gene_ids[gene_idx]),
                ] {
                    sink.emit(
                        DISC_GENE_PARTIAL_CONFLICT.name,
                        Finding::keyed([conflict.key()], locator),
                    );
                }
            }
        }
        Ok(())
    }
}
