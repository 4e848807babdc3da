//! Record trees from JSON documents.
//!
//! ```json
//! {
//!   "name": "submission",
//!   "descriptors": [{ "kind": "source", "qualifiers": { "taxname": ["Escherichia coli"] } }],
//!   "children": [
//!     { "record": { "id": "seq1", "molecule": "dna", "sequence": "ACGT", "annotations": [] } },
//!     { "entry": { "name": "set", "children": [] } }
//!   ]
//! }
//! ```

use std::io::Read;
use std::path::Path;

use arcstr::ArcStr;
use log::info;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::tree::{
    Annotation,
    Descriptor,
    NodeId,
    Record,
    RecordTree,
};
use crate::data_structs::typedef::PosType;
use crate::data_structs::{
    Completeness,
    MolType,
};
use crate::error::DiscrepResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDoc {
    pub name:        String,
    #[serde(default)]
    pub descriptors: Vec<Descriptor>,
    #[serde(default)]
    pub children:    Vec<ChildDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildDoc {
    Entry(EntryDoc),
    Record(RecordDoc),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDoc {
    pub id:           ArcStr,
    #[serde(default)]
    pub molecule:     MolType,
    #[serde(default)]
    pub completeness: Completeness,
    #[serde(default)]
    pub sequence:     Option<String>,
    /// Used when no sequence is given.
    #[serde(default)]
    pub length:       Option<PosType>,
    #[serde(default)]
    pub descriptors:  Vec<Descriptor>,
    #[serde(default)]
    pub annotations:  Vec<Annotation>,
}

impl EntryDoc {
    fn insert(
        self,
        tree: &mut RecordTree,
        node: NodeId,
    ) -> DiscrepResult<()> {
        for descriptor in self.descriptors {
            tree.add_descriptor(node, descriptor)?;
        }
        for child in self.children {
            match child {
                ChildDoc::Entry(entry) => {
                    let id = tree.add_entry(node, entry.name.as_str())?;
                    entry.insert(tree, id)?;
                },
                ChildDoc::Record(record) => record.insert(tree, node)?,
            }
        }
        Ok(())
    }

    pub fn into_tree(self) -> DiscrepResult<RecordTree> {
        let mut tree = RecordTree::new(self.name.as_str());
        let root = tree.root();
        self.insert(&mut tree, root)?;
        Ok(tree)
    }
}

impl RecordDoc {
    fn insert(
        self,
        tree: &mut RecordTree,
        parent: NodeId,
    ) -> DiscrepResult<()> {
        let mut record = Record::new(self.id, self.molecule).with_completeness(self.completeness);
        record = match (self.sequence, self.length) {
            (Some(sequence), _) => record.with_sequence(sequence),
            (None, Some(length)) => record.with_length(length),
            (None, None) => record,
        };
        let node = tree.add_record(parent, record)?;
        for descriptor in self.descriptors {
            tree.add_descriptor(node, descriptor)?;
        }
        for annotation in self.annotations {
            tree.add_annotation(node, annotation)?;
        }
        Ok(())
    }
}

pub fn read_json<R: Read>(reader: R) -> DiscrepResult<RecordTree> {
    let doc: EntryDoc = serde_json::from_reader(reader)?;
    let tree = doc.into_tree()?;
    info!("Read {} records from JSON", tree.records().len());
    Ok(tree)
}

pub fn read_json_file<P: AsRef<Path>>(path: P) -> DiscrepResult<RecordTree> {
    read_json(std::io::BufReader::new(std::fs::File::open(path)?))
}
