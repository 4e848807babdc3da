//! Links dependent features (CDS, RNAs) to the gene that governs them.
//!
//! Resolution runs in two tiers:
//!
//! 1. An explicit [`GeneXref`] is matched by identity against every gene,
//!    regardless of whether the gene was already claimed. A reference that
//!    matches no gene leaves the feature unassociated.
//! 2. Features without a reference go to the containing gene with the
//!    smallest span on a compatible strand, ties going to the gene listed
//!    first. Only this tier marks the gene as used in the [`Knockout`] set.
//!
//! Genes left unused once every dependent was processed are superfluous
//! candidates; dependents that matched nothing are missing associations.

use hashbrown::HashMap;
use itertools::Itertools;
use log::trace;
use rust_lapper::{
    Interval as LapperInterval,
    Lapper,
};

use super::compare::{
    compare,
    strands_compatible,
    Relation,
};
use crate::data_structs::tree::{
    Annotation,
    GeneRef,
    GeneXref,
};
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};

/// Used/unused flag per structural annotation, indexed like the population.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Knockout {
    used: Vec<bool>,
}

impl Knockout {
    pub fn new(len: usize) -> Self {
        Self {
            used: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn is_used(
        &self,
        index: usize,
    ) -> bool {
        self.used.get(index).copied().unwrap_or(false)
    }

    pub fn mark(
        &mut self,
        index: usize,
    ) {
        if let Some(flag) = self.used.get_mut(index) {
            *flag = true;
        }
    }

    /// Indices still unused, in population order.
    pub fn unused(&self) -> impl Iterator<Item = usize> + '_ {
        self.used
            .iter()
            .positions(|used| !*used)
    }
}

/// Outcome of resolving a single dependent annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Association {
    /// Matched by explicit cross-reference.
    Xref(usize),
    /// Matched by positional containment.
    Positional(usize),
    /// The dependent declares that it has no gene.
    Suppressed,
    /// Nothing matched.
    Missing,
}

impl Association {
    pub fn index(&self) -> Option<usize> {
        match self {
            Association::Xref(idx) | Association::Positional(idx) => Some(*idx),
            _ => None,
        }
    }
}

/// Result of resolving a whole dependent population.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One entry per dependent, in input order.
    pub associations: Vec<Association>,
    /// Structural indices never claimed positionally.
    pub superfluous:  Vec<usize>,
    /// Dependent indices with no association.
    pub missing:      Vec<usize>,
    /// Structural indices referenced by at least one cross-reference.
    pub referenced:   Vec<usize>,
}

/// Pre-indexed structural population.
pub struct AssociationResolver<'a> {
    structural: &'a [&'a Annotation],
    refs:       Vec<GeneRef>,
    index:      HashMap<SeqIdStr, Lapper<PosType, usize>>,
}

impl<'a> AssociationResolver<'a> {
    pub fn new(structural: &'a [&'a Annotation]) -> Self {
        let refs = structural
            .iter()
            .map(|a| a.gene_ref())
            .collect_vec();

        let index = structural
            .iter()
            .enumerate()
            .filter_map(|(idx, annotation)| {
                annotation.location().span().map(|span| {
                    (span.seqid().clone(), LapperInterval {
                        start: span.start(),
                        stop:  span.end(),
                        val:   idx,
                    })
                })
            })
            .into_group_map()
            .into_iter()
            .map(|(seqid, intervals)| (seqid, Lapper::new(intervals)))
            .collect();

        Self {
            structural,
            refs,
            index,
        }
    }

    pub fn structural(&self) -> &[&'a Annotation] {
        self.structural
    }

    fn by_xref(
        &self,
        xref: &GeneRef,
    ) -> Option<usize> {
        self.refs.iter().position(|r| r == xref)
    }

    fn by_position(
        &self,
        dependent: &Annotation,
    ) -> Option<usize> {
        let span = dependent.location().span()?;
        let lapper = self.index.get(span.seqid())?;

        lapper
            .find(span.start(), span.end())
            .map(|hit| hit.val)
            .filter(|idx| {
                let gene = self.structural[*idx].location();
                matches!(
                    compare(gene, dependent.location()),
                    Relation::Same | Relation::Contains
                ) && strands_compatible(gene, dependent.location())
            })
            .min_by_key(|idx| {
                let span = self.structural[*idx].location().span();
                (span.map(|s| s.length()), *idx)
            })
    }

    /// Resolves one dependent, flipping its positional match to used.
    pub fn associate(
        &self,
        dependent: &Annotation,
        knockout: &mut Knockout,
    ) -> Association {
        match dependent.gene_xref() {
            Some(GeneXref::Suppressed) => return Association::Suppressed,
            Some(GeneXref::Ref(xref)) if !xref.is_empty() => {
                return match self.by_xref(xref) {
                    Some(idx) => Association::Xref(idx),
                    None => {
                        trace!("cross-reference {:?} matched no gene", xref);
                        Association::Missing
                    },
                };
            },
            _ => {},
        }

        match self.by_position(dependent) {
            Some(idx) => {
                knockout.mark(idx);
                Association::Positional(idx)
            },
            None => Association::Missing,
        }
    }

    /// Resolves every dependent against a fresh knockout set.
    pub fn resolve_all(
        &self,
        dependents: &[&Annotation],
    ) -> Resolution {
        let mut knockout = Knockout::new(self.structural.len());
        let associations = dependents
            .iter()
            .map(|dependent| self.associate(dependent, &mut knockout))
            .collect_vec();

        let missing = associations
            .iter()
            .positions(|a| matches!(a, Association::Missing))
            .collect_vec();
        let referenced = associations
            .iter()
            .filter_map(|a| {
                match a {
                    Association::Xref(idx) => Some(*idx),
                    _ => None,
                }
            })
            .unique()
            .sorted()
            .collect_vec();

        Resolution {
            associations,
            superfluous: knockout.unused().collect(),
            missing,
            referenced,
        }
    }
}

/// One-shot resolution of a single dependent.
///
/// Returns the matched structural index, or `None` when the dependent is
/// suppressed or unmatched.
pub fn associate(
    dependent: &Annotation,
    structural: &[&Annotation],
    knockout: &mut Knockout,
) -> Option<usize> {
    AssociationResolver::new(structural)
        .associate(dependent, knockout)
        .index()
}
