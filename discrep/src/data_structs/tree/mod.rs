//! Arena-backed record tree.
//!
//! A [`RecordTree`] owns every node of one scan input. Nodes are addressed
//! by [`NodeId`] keys; parents list their children and nothing points back
//! up. Context that flows down the hierarchy (such as source descriptors set
//! on an enclosing entry) is collected during traversal, see
//! [`RecordTree::records`].
//!
//! - [`Entry`]: a collection holding child entries and records.
//! - [`Record`]: one sequence with its [`Annotation`]s and [`Descriptor`]s.
//! - [`Annotation`]: a feature with a [`Location`](crate::data_structs::coords::Location).
//! - [`Descriptor`]: metadata attached to an entry or a record.

mod annotation;

#[cfg(test)]
mod tests;

pub use annotation::{
    Annotation,
    Descriptor,
    GeneRef,
    GeneXref,
    Qualifiers,
};
use arcstr::ArcStr;
use slotmap::{
    new_key_type,
    SecondaryMap,
    SlotMap,
};

use crate::data_structs::enums::{
    Completeness,
    MolType,
};
use crate::data_structs::typedef::PosType;
use crate::error::{
    DiscrepError,
    DiscrepResult,
};
use crate::{
    getter_fn,
    with_field_fn,
};

new_key_type! {
    pub struct NodeId;
}

#[derive(Debug, Clone)]
pub struct Entry {
    name:        ArcStr,
    children:    Vec<NodeId>,
    descriptors: Vec<NodeId>,
}

impl Entry {
    getter_fn!(name, ArcStr);

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn descriptors(&self) -> &[NodeId] {
        &self.descriptors
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    id:           ArcStr,
    molecule:     MolType,
    completeness: Completeness,
    sequence:     Option<String>,
    length:       PosType,
    annotations:  Vec<NodeId>,
    descriptors:  Vec<NodeId>,
}

impl Record {
    pub fn new<S: Into<ArcStr>>(
        id: S,
        molecule: MolType,
    ) -> Self {
        Self {
            id: id.into(),
            molecule,
            completeness: Completeness::default(),
            sequence: None,
            length: 0,
            annotations: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    with_field_fn!(completeness, Completeness);

    with_field_fn!(length, PosType);

    /// Sets residues; the record length follows the sequence.
    pub fn with_sequence<S: Into<String>>(
        mut self,
        sequence: S,
    ) -> Self {
        let sequence = sequence.into();
        self.length = sequence.len() as PosType;
        self.sequence = Some(sequence);
        self
    }

    getter_fn!(id, ArcStr);

    pub fn molecule(&self) -> MolType {
        self.molecule
    }

    pub fn completeness(&self) -> Completeness {
        self.completeness
    }

    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_deref()
    }

    pub fn length(&self) -> PosType {
        self.length
    }

    pub fn annotations(&self) -> &[NodeId] {
        &self.annotations
    }

    pub fn descriptors(&self) -> &[NodeId] {
        &self.descriptors
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Entry(Entry),
    Record(Record),
    Annotation(Annotation),
    Descriptor(Descriptor),
}

/// A record reached during traversal, together with the descriptors
/// inherited from its enclosing entries (outermost first).
#[derive(Debug, Clone)]
pub struct RecordScope {
    pub id:        NodeId,
    pub inherited: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct RecordTree {
    nodes:    SlotMap<NodeId, Node>,
    locators: SecondaryMap<NodeId, String>,
    root:     NodeId,
}

impl RecordTree {
    pub fn new<S: Into<ArcStr>>(name: S) -> Self {
        let mut nodes = SlotMap::with_key();
        let name = name.into();
        let root = nodes.insert(Node::Entry(Entry {
            name:        name.clone(),
            children:    Vec::new(),
            descriptors: Vec::new(),
        }));
        let mut locators = SecondaryMap::new();
        locators.insert(root, name.to_string());
        Self {
            nodes,
            locators,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn add_entry<S: Into<ArcStr>>(
        &mut self,
        parent: NodeId,
        name: S,
    ) -> DiscrepResult<NodeId> {
        self.entry(parent)
            .ok_or_else(|| not_a("entry", parent))?;
        let name = name.into();
        let id = self.nodes.insert(Node::Entry(Entry {
            name:        name.clone(),
            children:    Vec::new(),
            descriptors: Vec::new(),
        }));
        self.locators.insert(id, name.to_string());
        self.entry_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub fn add_record(
        &mut self,
        parent: NodeId,
        mut record: Record,
    ) -> DiscrepResult<NodeId> {
        self.entry(parent)
            .ok_or_else(|| not_a("entry", parent))?;
        record.annotations.clear();
        record.descriptors.clear();
        let locator = record.id.to_string();
        let id = self.nodes.insert(Node::Record(record));
        self.locators.insert(id, locator);
        self.entry_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub fn add_annotation(
        &mut self,
        record: NodeId,
        annotation: Annotation,
    ) -> DiscrepResult<NodeId> {
        self.record(record)
            .ok_or_else(|| not_a("record", record))?;
        let locator = annotation.locator();
        let id = self.nodes.insert(Node::Annotation(annotation));
        self.locators.insert(id, locator);
        if let Some(Node::Record(rec)) = self.nodes.get_mut(record) {
            rec.annotations.push(id);
        }
        Ok(id)
    }

    /// Attaches a descriptor to an entry or a record.
    pub fn add_descriptor(
        &mut self,
        owner: NodeId,
        descriptor: Descriptor,
    ) -> DiscrepResult<NodeId> {
        let owner_name = match self.nodes.get(owner) {
            Some(Node::Entry(entry)) => entry.name.clone(),
            Some(Node::Record(record)) => record.id.clone(),
            _ => return Err(not_a("entry or record", owner)),
        };
        let locator = match descriptor.taxname() {
            Some(taxname) => format!("{}: {:?} {}", owner_name, descriptor.kind(), taxname),
            None => format!("{}: {:?}", owner_name, descriptor.kind()),
        };
        let id = self.nodes.insert(Node::Descriptor(descriptor));
        self.locators.insert(id, locator);
        match self.nodes.get_mut(owner) {
            Some(Node::Entry(entry)) => entry.descriptors.push(id),
            Some(Node::Record(record)) => record.descriptors.push(id),
            _ => {},
        }
        Ok(id)
    }

    pub fn get(
        &self,
        id: NodeId,
    ) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn entry(
        &self,
        id: NodeId,
    ) -> Option<&Entry> {
        match self.nodes.get(id) {
            Some(Node::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    fn entry_mut(
        &mut self,
        id: NodeId,
    ) -> DiscrepResult<&mut Entry> {
        match self.nodes.get_mut(id) {
            Some(Node::Entry(entry)) => Ok(entry),
            _ => Err(not_a("entry", id)),
        }
    }

    pub fn record(
        &self,
        id: NodeId,
    ) -> Option<&Record> {
        match self.nodes.get(id) {
            Some(Node::Record(record)) => Some(record),
            _ => None,
        }
    }

    pub fn annotation(
        &self,
        id: NodeId,
    ) -> Option<&Annotation> {
        match self.nodes.get(id) {
            Some(Node::Annotation(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn descriptor(
        &self,
        id: NodeId,
    ) -> Option<&Descriptor> {
        match self.nodes.get(id) {
            Some(Node::Descriptor(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    /// Human-readable locator of a node, computed when it was added.
    pub fn locator(
        &self,
        id: NodeId,
    ) -> &str {
        self.locators
            .get(id)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Annotations of a record in insertion order.
    pub fn annotations_of(
        &self,
        record: NodeId,
    ) -> impl Iterator<Item = (NodeId, &Annotation)> + '_ {
        self.record(record)
            .map(Record::annotations)
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.annotation(*id).map(|a| (*id, a)))
    }

    /// Descriptors attached directly to an entry or a record.
    pub fn descriptors_of(
        &self,
        owner: NodeId,
    ) -> impl Iterator<Item = (NodeId, &Descriptor)> + '_ {
        let ids: &[NodeId] = match self.nodes.get(owner) {
            Some(Node::Entry(entry)) => &entry.descriptors,
            Some(Node::Record(record)) => &record.descriptors,
            _ => &[],
        };
        ids.iter()
            .filter_map(|id| self.descriptor(*id).map(|d| (*id, d)))
    }

    /// Depth-first, pre-order list of records with inherited descriptors.
    pub fn records(&self) -> Vec<RecordScope> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, Vec<NodeId>)> = vec![(self.root, Vec::new())];

        while let Some((id, inherited)) = stack.pop() {
            match self.nodes.get(id) {
                Some(Node::Entry(entry)) => {
                    let mut scope = inherited;
                    scope.extend(entry.descriptors.iter().copied());
                    for child in entry.children.iter().rev() {
                        stack.push((*child, scope.clone()));
                    }
                },
                Some(Node::Record(_)) => {
                    out.push(RecordScope { id, inherited });
                },
                _ => {},
            }
        }
        out
    }

    /// Every descriptor in the tree, in depth-first order with each owner's
    /// descriptors preceding its children.
    pub fn all_descriptors(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            match self.nodes.get(id) {
                Some(Node::Entry(entry)) => {
                    out.extend(entry.descriptors.iter().copied());
                    stack.extend(entry.children.iter().rev().copied());
                },
                Some(Node::Record(record)) => {
                    out.extend(record.descriptors.iter().copied());
                },
                _ => {},
            }
        }
        out
    }
}

fn not_a(
    expected: &str,
    id: NodeId,
) -> DiscrepError {
    DiscrepError::InvalidTree(format!("node {:?} is not a valid {}", id, expected))
}
