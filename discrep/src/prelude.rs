pub use crate::config::{
    ReportKind,
    ScanConfig,
};
pub use crate::data_structs::coords::{
    Interval,
    Location,
};
pub use crate::data_structs::tree::{
    Annotation,
    Descriptor,
    GeneRef,
    GeneXref,
    NodeId,
    Qualifiers,
    Record,
    RecordTree,
};
pub use crate::data_structs::{
    Completeness,
    DescriptorKind,
    FeatureKind,
    MolType,
    Strand,
};
pub use crate::engine::{
    FamilyPass,
    RecordView,
    Rule,
    RuleFamily,
    RuleInfo,
    RuleRegistry,
    RuleScope,
    ScanContext,
    ScanSummary,
    Scanner,
    StaticLookup,
    TaxonRecord,
    TaxonomyLookup,
};
pub use crate::error::{
    DiscrepError,
    DiscrepResult,
};
pub use crate::findings::{
    Finding,
    FindingSink,
    FindingStore,
};
pub use crate::report::{
    ItemStatus,
    ReportItem,
    TextRenderer,
};
pub use crate::rules::standard_registry;
