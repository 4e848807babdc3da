//! Loaders that build a [`RecordTree`](crate::data_structs::tree::RecordTree).
//!
//! - [`json`]: full trees (nested entries, records, annotations and
//!   descriptors) from a serde document.
//! - [`gff`]: flat GFF3 annotation, one record per sequence id.

pub mod gff;
pub mod json;

use std::path::Path;

use crate::data_structs::tree::RecordTree;

/// Loads a tree, choosing the reader by file extension.
pub fn read_tree<P: AsRef<Path>>(path: P) -> anyhow::Result<RecordTree> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => Ok(json::read_json_file(path)?),
        "gff" | "gff3" => gff::read_gff_file(path),
        other => anyhow::bail!("Unsupported input format: {:?}", other),
    }
}
