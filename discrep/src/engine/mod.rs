//! Rule dispatch.
//!
//! A [`RuleRegistry`] holds stand-alone [`Rule`]s and [`FamilyPass`]es. A
//! [`Scanner`] resolves the enabled subset from a
//! [`ScanConfig`](crate::config::ScanConfig) and walks a record tree:
//! record-scope rules run once per record in depth-first order, then
//! entry-scope rules run once for the whole tree. Family passes are claimed
//! in a [`OnceGuard`] so they run once per container however many of their
//! members are enabled.
//!
//! Rule errors and panics are caught per invocation and stored as failures;
//! the scan always completes (or stops at a record boundary when cancelled).

mod guard;
mod lookup;
mod registry;
mod rule;
mod walker;

#[cfg(test)]
mod tests;

pub use guard::OnceGuard;
pub use lookup::{
    StaticLookup,
    TaxonRecord,
    TaxonomyLookup,
    UnavailableLookup,
};
pub use registry::{
    Owner,
    RuleRegistry,
};
pub use rule::{
    FamilyPass,
    RecordView,
    Rule,
    RuleFamily,
    RuleInfo,
    RuleScope,
    ScanContext,
    DISCREPANCY,
    ONCALLER,
};
pub use walker::{
    ProgressFn,
    ScanSummary,
    Scanner,
};
