use std::fmt::{
    Display,
    Write,
};

use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use super::Interval;
use crate::data_structs::enums::Strand;
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};
use crate::error::{
    DiscrepError,
    DiscrepResult,
};
use crate::with_field_fn;

/// Ordered, strand-aware set of intervals describing where a feature lies.
///
/// Intervals are kept in biological (5' to 3') order, which for minus-strand
/// features is numerically descending. No two intervals share a base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    intervals:     Vec<Interval>,
    partial_start: bool,
    partial_stop:  bool,
}

#[derive(Deserialize)]
struct RawLocation {
    intervals:     Vec<Interval>,
    #[serde(default)]
    partial_start: bool,
    #[serde(default)]
    partial_stop:  bool,
}

impl TryFrom<RawLocation> for Location {
    type Error = DiscrepError;

    fn try_from(value: RawLocation) -> Result<Self, Self::Error> {
        Ok(Location::new(value.intervals)?
            .with_partial_start(value.partial_start)
            .with_partial_stop(value.partial_stop))
    }
}

impl From<Interval> for Location {
    fn from(value: Interval) -> Self {
        Self {
            intervals:     vec![value],
            partial_start: false,
            partial_stop:  false,
        }
    }
}

impl Location {
    /// Builds a location, checking that intervals are well formed, disjoint
    /// and listed in biological order.
    pub fn new(intervals: Vec<Interval>) -> DiscrepResult<Self> {
        for interval in intervals.iter() {
            interval.validate()?;
        }
        for (a, b) in intervals.iter().tuple_combinations() {
            if a.overlaps(b) {
                return Err(DiscrepError::InvalidLocation(format!(
                    "intervals {} and {} overlap",
                    a, b
                )));
            }
        }
        for (prev, next) in intervals.iter().tuple_windows() {
            if prev.seqid() != next.seqid() || prev.strand() != next.strand() {
                continue;
            }
            let ordered = if prev.strand().is_minus() {
                next.end() <= prev.start()
            }
            else {
                prev.end() <= next.start()
            };
            if !ordered {
                return Err(DiscrepError::InvalidLocation(format!(
                    "intervals {} and {} are not in biological order",
                    prev, next
                )));
            }
        }

        Ok(Self {
            intervals,
            partial_start: false,
            partial_stop: false,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    with_field_fn!(partial_start, bool);

    with_field_fn!(partial_stop, bool);

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn partial_start(&self) -> bool {
        self.partial_start
    }

    pub fn partial_stop(&self) -> bool {
        self.partial_stop
    }

    pub fn is_partial(&self) -> bool {
        self.partial_start || self.partial_stop
    }

    /// True when the location covers no bases at all.
    pub fn is_empty(&self) -> bool {
        self.total_length() == 0
    }

    pub fn total_length(&self) -> PosType {
        self.intervals.iter().map(Interval::length).sum()
    }

    pub fn seqid(&self) -> Option<&SeqIdStr> {
        self.intervals.first().map(Interval::seqid)
    }

    /// Common strand of all intervals, or [`Strand::None`] when they
    /// disagree.
    pub fn strand(&self) -> Strand {
        let mut strands = self.intervals.iter().map(Interval::strand);
        match strands.next() {
            Some(first) if strands.all(|s| s == first) => first,
            _ => Strand::None,
        }
    }

    /// Smallest single interval enclosing every interval on the first
    /// sequence.
    pub fn span(&self) -> Option<Interval> {
        let seqid = self.seqid()?;
        let (start, end) = self
            .intervals
            .iter()
            .filter(|i| i.seqid() == seqid)
            .fold((PosType::MAX, PosType::MIN), |(s, e), i| {
                (s.min(i.start()), e.max(i.end()))
            });
        Some(Interval::new(seqid.clone(), start, end, self.strand()))
    }

    /// Boundary at which the feature begins in biological order.
    pub fn five_prime(&self) -> Option<PosType> {
        self.intervals.first().map(Interval::five_prime)
    }

    /// Boundary at which the feature ends in biological order.
    pub fn three_prime(&self) -> Option<PosType> {
        self.intervals.last().map(Interval::three_prime)
    }

    /// Covered bases as sorted, merged, strandless intervals.
    pub fn merged(&self) -> Vec<Interval> {
        let mut merged: Vec<Interval> = Vec::with_capacity(self.intervals.len());
        for interval in self
            .intervals
            .iter()
            .filter(|i| !i.is_empty())
            .sorted_by(|a, b| (a.seqid(), a.start()).cmp(&(b.seqid(), b.start())))
        {
            match merged.last_mut() {
                Some(last)
                    if last.seqid() == interval.seqid() && last.end() >= interval.start() =>
                {
                    if interval.end() > last.end() {
                        *last = Interval::new(
                            last.seqid().clone(),
                            last.start(),
                            interval.end(),
                            Strand::None,
                        );
                    }
                },
                _ => merged.push(interval.clone().with_strand(Strand::None)),
            }
        }
        merged
    }

    /// Lengths of the gaps between consecutive intervals on the same
    /// sequence and strand.
    pub fn gaps(&self) -> impl Iterator<Item = PosType> + '_ {
        self.intervals
            .iter()
            .tuple_windows()
            .filter(|(a, b)| a.seqid() == b.seqid() && a.strand() == b.strand())
            .map(|(a, b)| {
                if a.strand().is_minus() {
                    a.start().saturating_sub(b.end())
                }
                else {
                    b.start().saturating_sub(a.end())
                }
            })
    }
}

impl Display for Location {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let Some(seqid) = self.seqid()
        else {
            return write!(f, "<empty>");
        };
        let last = self.intervals.len() - 1;
        let mut out = String::new();
        write!(out, "{}:", seqid)?;
        for (idx, interval) in self.intervals.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            if interval.seqid() != seqid {
                write!(out, "{}:", interval.seqid())?;
            }
            let minus = interval.strand().is_minus();
            let (from, to) = if minus {
                (interval.end(), interval.start() + 1)
            }
            else {
                (interval.start() + 1, interval.end())
            };
            if minus {
                out.push('c');
            }
            if idx == 0 && self.partial_start {
                out.push('<');
            }
            write!(out, "{}-", from)?;
            if idx == last && self.partial_stop {
                out.push('>');
            }
            write!(out, "{}", to)?;
        }
        f.write_str(&out)
    }
}
