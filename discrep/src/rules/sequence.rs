//! Whole-sequence checks.

use itertools::Itertools;

use crate::data_structs::{
    Completeness,
    FeatureKind,
    MolType,
};
use crate::engine::{
    RecordView,
    Rule,
    RuleInfo,
    RuleScope,
    ScanContext,
};
use crate::findings::{
    Finding,
    FindingSink,
};
use crate::utils::n_runs;

pub struct CountNucleotides;

impl CountNucleotides {
    pub const INFO: RuleInfo = RuleInfo::new(
        "COUNT_NUCLEOTIDES",
        "Count nucleotide sequences",
        "[n] nucleotide Bioseq[s] [is] present.",
        RuleScope::Record,
    );
}

impl Rule for CountNucleotides {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        if view.record.molecule().is_nucleotide() {
            sink.emit(Self::INFO.name, Finding::new(view.id()));
        }
        Ok(())
    }
}

pub struct CountProteins;

impl CountProteins {
    pub const INFO: RuleInfo = RuleInfo::new(
        "COUNT_PROTEINS",
        "Count Proteins",
        "[n] protein sequence[s] [is] present.",
        RuleScope::Record,
    );
}

impl Rule for CountProteins {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        if view.record.molecule() == MolType::Protein {
            sink.emit(Self::INFO.name, Finding::new(view.id()));
        }
        Ok(())
    }
}

/// Nucleotide sequences below `short_sequence_len`.
pub struct ShortSequences;

impl ShortSequences {
    pub const INFO: RuleInfo = RuleInfo::new(
        "SHORT_SEQUENCES",
        "Find Short Sequences",
        "[n] sequence[s] [is] shorter than the minimum length.",
        RuleScope::Record,
    );
}

impl Rule for ShortSequences {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let record = view.record;
        if record.molecule().is_nucleotide() && record.length() < ctx.config.short_sequence_len {
            sink.emit(
                Self::INFO.name,
                Finding::new(format!("{} ({} nt)", view.id(), record.length())),
            );
        }
        Ok(())
    }
}

/// Sequences holding runs of `N` at least `n_run_len` long. The locator
/// lists every run in 1-based inclusive coordinates.
pub struct NRuns;

impl NRuns {
    pub const INFO: RuleInfo = RuleInfo::new(
        "N_RUNS",
        "Runs of 10 or more Ns",
        "[n] sequence[s] [has] runs of Ns.",
        RuleScope::Record,
    );
}

impl Rule for NRuns {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let Some(sequence) = view.record.sequence()
        else {
            return Ok(());
        };
        if !view.record.molecule().is_nucleotide() {
            return Ok(());
        }
        let runs = n_runs(sequence, ctx.config.n_run_len);
        if !runs.is_empty() {
            let ranges = runs
                .iter()
                .map(|(start, end)| format!("{}-{}", start + 1, end))
                .join(", ");
            sink.emit(
                Self::INFO.name,
                Finding::new(format!("{}: {}", view.id(), ranges)),
            );
        }
        Ok(())
    }
}

pub struct PartialCdsCompleteSequence;

impl PartialCdsCompleteSequence {
    pub const INFO: RuleInfo = RuleInfo::new(
        "PARTIAL_CDS_COMPLETE_SEQUENCE",
        "Partial CDSs in Complete Sequences",
        "[n] partial CDS[s] in complete sequence[s].",
        RuleScope::Record,
    );
}

impl Rule for PartialCdsCompleteSequence {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        if view.record.completeness() != Completeness::Complete {
            return Ok(());
        }
        for (id, cds) in view.of_kind(&FeatureKind::Cds) {
            if cds.location().is_partial() {
                sink.emit(Self::INFO.name, Finding::new(view.locator(id)));
            }
        }
        Ok(())
    }
}
