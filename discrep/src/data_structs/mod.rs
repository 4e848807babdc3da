//! Core data structures of the scan input.
//!
//! - [`coords`]: genomic [`Interval`](coords::Interval)s and strand-aware
//!   multi-part [`Location`](coords::Location)s.
//! - [`tree`]: the arena-backed [`RecordTree`](tree::RecordTree) of entries,
//!   records, annotations and descriptors.
//! - Common enumerations such as [`Strand`], [`FeatureKind`] and [`MolType`].
//! - [`typedef`]: type aliases for positions and shared identifiers.

pub mod coords;
mod enums;
pub mod tree;
pub mod typedef;

pub use enums::{
    Completeness,
    DescriptorKind,
    FeatureKind,
    MolType,
    Strand,
};
