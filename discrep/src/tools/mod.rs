//! Pure analysis helpers shared by rules.
//!
//! - [`compare`]: positional relations, strand compatibility and adjacency
//!   between locations.
//! - [`association`]: gene association with knockout tracking.
//! - [`distribution`]: qualifier value distribution across a population.

pub mod association;
pub mod compare;
pub mod distribution;
