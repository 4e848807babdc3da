//! # discrep
//!
//! `discrep` is a rule-based inspection engine for annotated biological
//! sequence collections. It walks a tree of entries, records, annotations
//! and source descriptors, runs a catalogue of discrepancy rules over it and
//! renders the findings as a nested, deduplicated report.
//!
//! If you do not want to use discrep as a crate, check out the `discrep`
//! command-line tool in the `discrep-ci` package.
//!
//! ## Key Features
//!
//! * **Arena record tree**: entries, records, annotations and descriptors
//!   stored in a [`RecordTree`] and addressed by key, with source context
//!   inherited down the hierarchy during traversal.
//! * **Shared rule passes**: related rules form a [`RuleFamily`] whose
//!   expensive pass runs once per container however many members are
//!   enabled.
//! * **Typed findings**: rules emit [`Finding`]s (classification keys plus a
//!   locator) into a [`FindingStore`]; a packed `key$locator` form is
//!   accepted for string-based rules.
//! * **Hierarchical reports**: findings are grouped into [`ReportItem`]
//!   trees with count-aware descriptions and FATAL tagging.
//! * **Parallel scans**: optional record-level parallelism on a rayon pool,
//!   with results identical to a sequential scan.
//!
//! Number of threads used by parallel scans can be configured with the
//! `DISCREP_NUM_THREADS` environment variable.
//!
//! ## Structure
//!
//! * [`data_structs`]: locations, intervals and the record tree.
//! * [`findings`]: findings, their packed codec and the scan-scoped store.
//! * [`tools`]: interval comparison, gene association and qualifier
//!   distribution helpers used by rules.
//! * [`engine`]: rule traits, the registry, the once-guard and the
//!   [`Scanner`] that walks trees.
//! * [`rules`]: the built-in rule catalogue.
//! * [`report`]: report building, templates, fatal policy and rendering.
//! * [`io`]: JSON and GFF3 loaders.
//!
//! ## Usage
//!
//! ```no_run
//! use discrep::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let tree = discrep::io::read_tree("submission.json")?;
//!     let config = ScanConfig::default().with_kind(ReportKind::Oncaller);
//!     let scanner = Scanner::new(standard_registry()?, config)?;
//!
//!     let (summary, report) = scanner.scan(&tree);
//!     println!("{} of {} records scanned", summary.visited, summary.records);
//!     print!("{}", TextRenderer::new().render_to_string(&report));
//!     Ok(())
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod data_structs;
pub mod engine;
pub mod error;
pub mod findings;
pub mod io;
pub mod prelude;
pub mod report;
pub mod rules;
pub mod tools;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
