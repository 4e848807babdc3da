use arcstr::ArcStr;

/// Zero-based sequence coordinate.
pub type PosType = u32;

/// Shared sequence identifier. Cheap to clone across intervals.
pub type SeqIdStr = ArcStr;

/// Rule identifiers as stored in findings and reports.
pub type RuleName = ArcStr;
