#![allow(dead_code)]
use serde_json::{
    json,
    Value,
};

/// Defects that can be planted into a [`DemoSubmission`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Defects {
    /// Adds a CDS with no gene to the first record.
    pub orphan_cds:        bool,
    /// Adds a gene overlapping the first gene of the first record.
    pub overlapping_genes: bool,
    /// Drops the locus tag of the last gene.
    pub missing_locus_tag: bool,
    /// Gives the second record's source a different country.
    pub mixed_country:     bool,
}

/// Synthetic submission with `n_records` nucleotide records, each carrying
/// `genes_per_record` gene/CDS pairs 1 kb apart.
pub struct DemoSubmission {
    n_records:        usize,
    genes_per_record: usize,
    defects:          Defects,
}

fn interval(
    seqid: &str,
    start: u32,
    end: u32,
    strand: &str,
) -> Value {
    json!({ "intervals": [{ "seqid": seqid, "start": start, "end": end, "strand": strand }] })
}

impl DemoSubmission {
    pub fn new(
        n_records: usize,
        genes_per_record: usize,
    ) -> Self {
        Self {
            n_records,
            genes_per_record,
            defects: Defects::default(),
        }
    }

    pub fn with_defects(
        mut self,
        defects: Defects,
    ) -> Self {
        self.defects = defects;
        self
    }

    /// Locus tag of gene `gene` on record `record`.
    pub fn locus_tag(
        record: usize,
        gene: usize,
    ) -> String {
        format!("DEMO_{:02}{:03}", record, gene)
    }

    fn record(
        &self,
        idx: usize,
    ) -> Value {
        let seqid = format!("seq{}", idx + 1);
        let last_record = idx + 1 == self.n_records;
        let mut annotations = Vec::new();

        for gene in 0..self.genes_per_record {
            let start = (gene as u32) * 1000;
            let strand = if gene % 2 == 0 { "+" } else { "-" };
            let mut qualifiers = json!({ "locus_tag": [Self::locus_tag(idx, gene)] });
            if self.defects.missing_locus_tag && last_record && gene + 1 == self.genes_per_record {
                qualifiers = json!({});
            }
            annotations.push(json!({
                "kind": "gene",
                "location": interval(&seqid, start, start + 900, strand),
                "qualifiers": qualifiers,
            }));
            annotations.push(json!({
                "kind": "CDS",
                "location": interval(&seqid, start + 30, start + 870, strand),
                "qualifiers": { "product": ["hypothetical protein"] },
            }));
        }

        if idx == 0 && self.defects.orphan_cds {
            let start = (self.genes_per_record as u32) * 1000 + 100;
            annotations.push(json!({
                "kind": "CDS",
                "location": interval(&seqid, start, start + 300, "+"),
                "qualifiers": { "product": ["orphan protein"] },
            }));
        }
        if idx == 0 && self.defects.overlapping_genes {
            annotations.push(json!({
                "kind": "gene",
                "location": interval(&seqid, 500, 1500, "+"),
                "qualifiers": { "locus_tag": ["DEMO_99999"] },
            }));
        }

        let country = if idx == 1 && self.defects.mixed_country {
            "Canada"
        }
        else {
            "USA"
        };
        json!({
            "record": {
                "id": seqid,
                "molecule": "dna",
                "completeness": "partial",
                "length": (self.genes_per_record as u32 + 1) * 1000,
                "descriptors": [{
                    "kind": "source",
                    "qualifiers": {
                        "taxname": ["Escherichia coli"],
                        "strain": ["K-12"],
                        "country": [country],
                    },
                }],
                "annotations": annotations,
            }
        })
    }

    pub fn to_value(&self) -> Value {
        let children: Vec<Value> = (0..self.n_records)
            .map(|idx| self.record(idx))
            .collect();
        json!({
            "name": "demo-submission",
            "descriptors": [{ "kind": "title", "text": "Demo submission" }],
            "children": [{ "entry": { "name": "demo-set", "children": children } }],
        })
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}
