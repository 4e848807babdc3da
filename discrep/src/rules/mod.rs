//! Built-in rule catalogue.
//!
//! | family            | scope  | rules                                                        |
//! |-------------------|--------|--------------------------------------------------------------|
//! | (none)            | record | `COUNT_NUCLEOTIDES`, `COUNT_PROTEINS`, `SHORT_SEQUENCES`,     |
//! |                   |        | `N_RUNS`, `PARTIAL_CDS_COMPLETE_SEQUENCE`, `CONTAINED_CDS`,   |
//! |                   |        | `DISC_EXON_INTRON_CONFLICT`, `DISC_SHORT_INTRON`,             |
//! |                   |        | `DISC_FEATURE_COUNT`                                          |
//! | `GenePairs`       | record | `OVERLAPPING_GENES`, `FIND_OVERLAPPED_GENES`                  |
//! | `GeneAssociation` | record | `MISSING_GENES`, `EXTRA_GENES`, `DISC_BAD_GENE_STRAND`,       |
//! |                   |        | `DISC_GENE_PARTIAL_CONFLICT`                                  |
//! | `SourceQuals`     | entry  | `DISC_SOURCE_QUALS_ASNDISC`, `ONCALLER_MULTISRC`              |
//! | `LocusTags`       | entry  | `MISSING_LOCUS_TAGS`, `DUPLICATE_LOCUS_TAGS`,                 |
//! |                   |        | `INCONSISTENT_LOCUS_TAG_PREFIX`, `BAD_LOCUS_TAG_FORMAT`       |
//! | `Taxonomy`        | entry  | `TAX_LOOKUP_MISSING`, `TAX_LOOKUP_MISMATCH`                   |

pub mod features;
pub mod genes;
pub mod locus_tags;
pub mod sequence;
pub mod source;


use crate::engine::RuleRegistry;
use crate::error::DiscrepResult;

/// Registry holding every built-in rule in report order.
pub fn standard_registry() -> DiscrepResult<RuleRegistry> {
    let mut registry = RuleRegistry::new();

    registry.register_rule(sequence::CountNucleotides)?;
    registry.register_rule(sequence::CountProteins)?;
    registry.register_rule(sequence::ShortSequences)?;
    registry.register_rule(sequence::NRuns)?;
    registry.register_rule(sequence::PartialCdsCompleteSequence)?;
    registry.register_rule(features::ContainedCds)?;
    registry.register_rule(features::ExonIntronConflict)?;
    registry.register_rule(features::ShortIntron)?;
    registry.register_rule(features::FeatureCount)?;
    registry.register_family(genes::GenePairs::default())?;
    registry.register_family(genes::GeneAssociation::default())?;
    registry.register_family(source::SourceQuals::default())?;
    registry.register_family(locus_tags::LocusTags::default())?;
    registry.register_family(source::Taxonomy::default())?;

    Ok(registry)
}
