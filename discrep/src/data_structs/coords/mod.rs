//! Genomic coordinates: single [`Interval`]s and multi-part [`Location`]s.
//!
//! All coordinates are zero-based and half-open. Display output is
//! one-based and inclusive, with minus-strand intervals written as
//! `c<high>-<low>`.

mod interval;
mod location;

#[cfg(test)]
mod tests;

pub use interval::Interval;
pub use location::Location;
