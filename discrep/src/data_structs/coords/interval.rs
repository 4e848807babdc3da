use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::enums::Strand;
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};
use crate::error::{
    DiscrepError,
    DiscrepResult,
};
use crate::getter_fn;

/// A single half-open stretch `[start, end)` of a reference sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    seqid:  SeqIdStr,
    start:  PosType,
    end:    PosType,
    #[serde(default)]
    strand: Strand,
}

impl Interval {
    /// Creates a new `Interval`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`. Use [`Interval::try_new`] for untrusted input.
    pub fn new<S: Into<SeqIdStr>>(
        seqid: S,
        start: PosType,
        end: PosType,
        strand: Strand,
    ) -> Self {
        assert!(
            start <= end,
            "Start position must be less than or equal to end position"
        );
        Self {
            seqid: seqid.into(),
            start,
            end,
            strand,
        }
    }

    pub fn try_new<S: Into<SeqIdStr>>(
        seqid: S,
        start: PosType,
        end: PosType,
        strand: Strand,
    ) -> DiscrepResult<Self> {
        let interval = Self {
            seqid: seqid.into(),
            start,
            end,
            strand,
        };
        interval.validate()?;
        Ok(interval)
    }

    pub(crate) fn validate(&self) -> DiscrepResult<()> {
        if self.start > self.end {
            return Err(DiscrepError::InvalidLocation(format!(
                "start {} is past end {} on {}",
                self.start, self.end, self.seqid
            )));
        }
        Ok(())
    }

    getter_fn!(seqid, SeqIdStr);

    pub fn start(&self) -> PosType {
        self.start
    }

    pub fn end(&self) -> PosType {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn length(&self) -> PosType {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Boundary at which this interval begins in biological order.
    pub fn five_prime(&self) -> PosType {
        if self.strand.is_minus() {
            self.end
        }
        else {
            self.start
        }
    }

    /// Boundary at which this interval ends in biological order.
    pub fn three_prime(&self) -> PosType {
        if self.strand.is_minus() {
            self.start
        }
        else {
            self.end
        }
    }

    /// Checks if two intervals share at least one base.
    pub fn overlaps(
        &self,
        other: &Self,
    ) -> bool {
        self.seqid == other.seqid
            && self.start < other.end
            && other.start < self.end
    }

    /// Checks if this interval is fully contained within another interval.
    pub fn is_in(
        &self,
        other: &Self,
    ) -> bool {
        self.seqid == other.seqid
            && self.start >= other.start
            && self.end <= other.end
    }

    pub(crate) fn with_strand(
        mut self,
        strand: Strand,
    ) -> Self {
        self.strand = strand;
        self
    }
}

impl Display for Interval {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if self.strand.is_minus() {
            write!(f, "{}:c{}-{}", self.seqid, self.end, self.start + 1)
        }
        else {
            write!(f, "{}:{}-{}", self.seqid, self.start + 1, self.end)
        }
    }
}
