//! Positional comparison of [`Location`]s.
//!
//! Relations are computed over the set of covered bases, ignoring strand.
//! Strand agreement is a separate question answered by
//! [`strands_compatible`].

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::coords::{
    Interval,
    Location,
};
use crate::data_structs::typedef::PosType;
use crate::data_structs::Strand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Both cover exactly the same bases.
    Same,
    /// The first covers every base of the second, and more.
    Contains,
    /// The second covers every base of the first, and more.
    ContainedBy,
    /// Some shared bases; neither spans the other.
    Overlap,
    /// No shared bases, or either side is empty.
    NoOverlap,
    /// Some shared bases, and one span encloses the other although its bases
    /// do not cover it (e.g. an exon straddling an intron of the other).
    Mixed,
}

impl Relation {
    /// Relation seen from the other side.
    pub fn inverse(self) -> Self {
        match self {
            Relation::Contains => Relation::ContainedBy,
            Relation::ContainedBy => Relation::Contains,
            other => other,
        }
    }

    pub fn shares_bases(self) -> bool {
        !matches!(self, Relation::NoOverlap)
    }
}

fn covered(intervals: &[Interval]) -> PosType {
    intervals.iter().map(Interval::length).sum()
}

fn shared_bases(
    a: &[Interval],
    b: &[Interval],
) -> PosType {
    let mut shared = 0;
    for x in a {
        for y in b.iter().filter(|y| y.seqid() == x.seqid()) {
            let start = x.start().max(y.start());
            let end = x.end().min(y.end());
            if start < end {
                shared += end - start;
            }
        }
    }
    shared
}

/// Classifies how `a` lies relative to `b`.
///
/// Empty locations never match anything, not even each other.
pub fn compare(
    a: &Location,
    b: &Location,
) -> Relation {
    if a.is_empty() || b.is_empty() {
        return Relation::NoOverlap;
    }
    let merged_a = a.merged();
    let merged_b = b.merged();

    let shared = shared_bases(&merged_a, &merged_b);
    if shared == 0 {
        return Relation::NoOverlap;
    }
    if merged_a == merged_b {
        return Relation::Same;
    }
    if shared == covered(&merged_b) {
        return Relation::Contains;
    }
    if shared == covered(&merged_a) {
        return Relation::ContainedBy;
    }

    match (a.span(), b.span()) {
        (Some(span_a), Some(span_b)) if span_b.is_in(&span_a) || span_a.is_in(&span_b) => {
            Relation::Mixed
        },
        _ => Relation::Overlap,
    }
}

/// Minus pairs with minus; anything else pairs with anything but minus.
pub fn strands_compatible(
    a: &Location,
    b: &Location,
) -> bool {
    a.strand().is_minus() == b.strand().is_minus()
}

/// Whether the biological end of `a` abuts the biological start of `b`
/// when both are read along `strand`.
pub fn adjacent(
    a: &Location,
    b: &Location,
    strand: Strand,
) -> bool {
    let (Some(span_a), Some(span_b)) = (a.span(), b.span())
    else {
        return false;
    };
    if a.is_empty() || b.is_empty() || span_a.seqid() != span_b.seqid() {
        return false;
    }
    if strand.is_minus() {
        span_a.start() == span_b.end()
    }
    else {
        span_a.end() == span_b.start()
    }
}

/// Whether the outer spans of `a` and `b` start or stop at the same place.
pub fn shares_endpoint(
    a: &Location,
    b: &Location,
) -> bool {
    match (a.span(), b.span()) {
        (Some(span_a), Some(span_b)) if span_a.seqid() == span_b.seqid() => {
            span_a.start() == span_b.start() || span_a.end() == span_b.end()
        },
        _ => false,
    }
}
