use serde::Serialize;

use crate::config::{
    ReportKind,
    ScanConfig,
};
use crate::data_structs::tree::{
    Annotation,
    Descriptor,
    NodeId,
    Record,
    RecordTree,
};
use crate::data_structs::FeatureKind;
use crate::engine::lookup::TaxonomyLookup;
use crate::findings::FindingSink;

/// Which container a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleScope {
    /// Called once for every record.
    Record,
    /// Called once for the whole tree.
    Entry,
}

/// Rules that share one pass over a container.
///
/// Every member of a family is served by the same [`FamilyPass`]; the pass
/// runs once per container no matter how many members are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RuleFamily {
    GenePairs,
    GeneAssociation,
    SourceQuals,
    LocusTags,
    Taxonomy,
}

/// Static description of a rule.
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    /// Stable identifier used in configuration and reports.
    pub name:    &'static str,
    pub title:   &'static str,
    /// Description template for the top-level report item.
    pub summary: &'static str,
    pub scope:   RuleScope,
    /// Report kinds that enable the rule by default.
    pub kinds:   &'static [ReportKind],
    pub family:  Option<RuleFamily>,
}

pub const DISCREPANCY: &[ReportKind] = &[ReportKind::Discrepancy, ReportKind::Oncaller];
pub const ONCALLER: &[ReportKind] = &[ReportKind::Oncaller];

impl RuleInfo {
    pub const fn new(
        name: &'static str,
        title: &'static str,
        summary: &'static str,
        scope: RuleScope,
    ) -> Self {
        Self {
            name,
            title,
            summary,
            scope,
            kinds: DISCREPANCY,
            family: None,
        }
    }

    pub const fn with_kinds(
        mut self,
        kinds: &'static [ReportKind],
    ) -> Self {
        self.kinds = kinds;
        self
    }

    pub const fn with_family(
        mut self,
        family: RuleFamily,
    ) -> Self {
        self.family = Some(family);
        self
    }

    pub fn enabled_for(
        &self,
        kind: ReportKind,
    ) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Read-only state shared by every rule invocation of one scan.
#[derive(Clone, Copy)]
pub struct ScanContext<'a> {
    pub tree:   &'a RecordTree,
    pub config: &'a ScanConfig,
    pub lookup: &'a dyn TaxonomyLookup,
}

/// A record as seen by record-scope rules.
#[derive(Clone, Copy)]
pub struct RecordView<'a> {
    pub node:      NodeId,
    pub record:    &'a Record,
    /// Descriptors of the enclosing entries, outermost first.
    pub inherited: &'a [NodeId],
    pub tree:      &'a RecordTree,
}

impl<'a> RecordView<'a> {
    pub fn id(&self) -> &'a str {
        self.record.id().as_str()
    }

    pub fn annotations(&self) -> impl Iterator<Item = (NodeId, &'a Annotation)> + 'a {
        self.tree.annotations_of(self.node)
    }

    pub fn of_kind(
        &self,
        kind: &FeatureKind,
    ) -> Vec<(NodeId, &'a Annotation)> {
        self.annotations()
            .filter(|(_, a)| a.kind() == kind)
            .collect()
    }

    /// Descriptors in scope for the record: inherited first, then its own.
    pub fn descriptors(&self) -> impl Iterator<Item = &'a Descriptor> + 'a {
        let tree = self.tree;
        self.inherited
            .iter()
            .filter_map(move |id| tree.descriptor(*id))
            .chain(tree.descriptors_of(self.node).map(|(_, d)| d))
    }

    pub fn locator(
        &self,
        id: NodeId,
    ) -> &'a str {
        self.tree.locator(id)
    }
}

/// A stand-alone rule.
///
/// Both hooks default to doing nothing; a rule overrides the one matching
/// its [`RuleScope`]. Errors are caught by the walker and reported against
/// the rule without stopping the scan.
pub trait Rule: Send + Sync {
    fn info(&self) -> &RuleInfo;

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        _view: &RecordView<'_>,
        _sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn check_entry(
        &self,
        _ctx: &ScanContext<'_>,
        _sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The shared pass behind a [`RuleFamily`].
///
/// The pass emits findings for all of its members; the sink drops those of
/// members that are not enabled.
pub trait FamilyPass: Send + Sync {
    fn family(&self) -> RuleFamily;

    fn scope(&self) -> RuleScope;

    fn members(&self) -> &[RuleInfo];

    fn run_record(
        &self,
        _ctx: &ScanContext<'_>,
        _view: &RecordView<'_>,
        _sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn run_entry(
        &self,
        _ctx: &ScanContext<'_>,
        _sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
