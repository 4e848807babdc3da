use rstest::{
    fixture,
    rstest,
};

use super::*;
use crate::data_structs::coords::{
    Interval,
    Location,
};
use crate::data_structs::enums::{
    FeatureKind,
    Strand,
};

#[fixture]
fn nested_tree() -> (RecordTree, Vec<NodeId>) {
    let mut tree = RecordTree::new("submission");
    let root = tree.root();
    tree.add_descriptor(root, Descriptor::source("Escherichia coli"))
        .unwrap();

    let set = tree.add_entry(root, "set1").unwrap();
    tree.add_descriptor(
        set,
        Descriptor::source("Escherichia coli").with_qualifier("strain", "K-12"),
    )
    .unwrap();
    let rec_a = tree
        .add_record(set, Record::new("seqA", MolType::Nucleotide).with_sequence("ACGT"))
        .unwrap();
    let rec_b = tree
        .add_record(set, Record::new("seqB", MolType::Nucleotide))
        .unwrap();
    let rec_c = tree
        .add_record(root, Record::new("seqC", MolType::Protein))
        .unwrap();
    (tree, vec![rec_a, rec_b, rec_c])
}

#[rstest]
fn test_records_are_depth_first(nested_tree: (RecordTree, Vec<NodeId>)) {
    let (tree, ids) = nested_tree;
    let visited: Vec<NodeId> = tree
        .records()
        .into_iter()
        .map(|scope| scope.id)
        .collect();
    assert_eq!(visited, ids);
}

#[rstest]
fn test_inherited_descriptors_flow_down(nested_tree: (RecordTree, Vec<NodeId>)) {
    let (tree, _ids) = nested_tree;
    let scopes = tree.records();
    assert_eq!(scopes[0].inherited.len(), 2);
    assert_eq!(scopes[1].inherited.len(), 2);
    // seqC sits directly under the root
    assert_eq!(scopes[2].inherited.len(), 1);

    let strain = tree
        .descriptor(scopes[0].inherited[1])
        .and_then(|d| d.qualifiers().first("strain"));
    assert_eq!(strain, Some("K-12"));
}

#[rstest]
fn test_all_descriptors_order(nested_tree: (RecordTree, Vec<NodeId>)) {
    let (mut tree, ids) = nested_tree;
    let own = tree
        .add_descriptor(ids[0], Descriptor::source("Bacillus subtilis"))
        .unwrap();
    let all = tree.all_descriptors();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2], own);
    assert_eq!(tree.locator(own), "seqA: Source Bacillus subtilis");
}

#[rstest]
fn test_record_accessors(nested_tree: (RecordTree, Vec<NodeId>)) {
    let (tree, ids) = nested_tree;
    let record = tree.record(ids[0]).unwrap();
    assert_eq!(record.id().as_str(), "seqA");
    assert_eq!(record.length(), 4);
    assert_eq!(record.sequence(), Some("ACGT"));
    assert!(tree.record(tree.root()).is_none());
    assert_eq!(tree.locator(ids[2]), "seqC");
}

#[rstest]
fn test_annotations_and_locators(nested_tree: (RecordTree, Vec<NodeId>)) {
    let (mut tree, ids) = nested_tree;
    let location = Location::from(Interval::new("seqA", 0, 3, Strand::Forward));
    let gene = Annotation::new(FeatureKind::Gene, location)
        .with_qualifier("locus_tag", "ECO_0001")
        .with_qualifier("gene", "abc");
    let gene_id = tree.add_annotation(ids[0], gene).unwrap();

    let annotations: Vec<_> = tree.annotations_of(ids[0]).collect();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].0, gene_id);
    assert_eq!(tree.locator(gene_id), "gene\tECO_0001\tseqA:1-3");
    assert_eq!(annotations[0].1.gene_ref().locus.as_deref(), Some("abc"));
}

#[rstest]
fn test_wrong_parent_kind_is_rejected(nested_tree: (RecordTree, Vec<NodeId>)) {
    let (mut tree, ids) = nested_tree;
    assert!(tree.add_entry(ids[0], "nested").is_err());
    assert!(tree
        .add_record(ids[0], Record::new("x", MolType::Nucleotide))
        .is_err());

    let root = tree.root();
    let annotation = Annotation::new(FeatureKind::Cds, Location::empty());
    assert!(tree.add_annotation(root, annotation).is_err());
}

#[test]
fn test_gene_ref_emptiness() {
    assert!(GeneRef::default().is_empty());
    assert!(!GeneRef::default().with_locus("abc").is_empty());

    let qualifiers: Qualifiers = [("db_xref", "GeneID:1"), ("db_xref", "GeneID:2")]
        .into_iter()
        .collect();
    let gene_ref = GeneRef::from_qualifiers(&qualifiers);
    assert_eq!(gene_ref.db_xrefs.len(), 2);
    assert!(gene_ref.locus.is_none());
}

#[test]
fn test_annotation_label_and_flags() {
    let cds = Annotation::new(FeatureKind::Cds, Location::empty())
        .with_qualifier("product", "hypothetical protein")
        .with_qualifier("note", "frameshift");
    assert_eq!(cds.label(), "hypothetical protein");
    assert_eq!(cds.comment(), Some("frameshift"));
    assert!(!cds.is_pseudo());
    assert!(cds.with_pseudo(true).is_pseudo());
}

#[test]
fn test_annotation_json_roundtrip_fields() {
    let json = r#"{
        "kind": "CDS",
        "location": {"intervals": [{"seqid": "s1", "start": 0, "end": 9, "strand": "+"}]},
        "qualifiers": {"product": ["kinase"]},
        "gene_xref": "suppressed"
    }"#;
    let annotation: Annotation = serde_json::from_str(json).unwrap();
    assert_eq!(annotation.kind(), &FeatureKind::Cds);
    assert_eq!(annotation.gene_xref(), Some(&GeneXref::Suppressed));
    assert_eq!(annotation.label(), "kinase");
}
