//! Record trees from GFF3.
//!
//! Every sequence id becomes one nucleotide record under the root entry.
//! `region` lines become the record's source descriptor (and set its
//! length); all other lines become annotations. Lines sharing a feature type
//! and an `ID` are joined into one multi-interval location. Coordinates
//! move from 1-based inclusive to half-open.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use bio::io::gff;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{
    debug,
    info,
};

use crate::data_structs::coords::{
    Interval,
    Location,
};
use crate::data_structs::tree::{
    Annotation,
    Descriptor,
    Qualifiers,
    Record,
    RecordTree,
};
use crate::data_structs::typedef::PosType;
use crate::data_structs::{
    Completeness,
    DescriptorKind,
    FeatureKind,
    MolType,
    Strand,
};

/// Attribute names translated to qualifier names.
const RENAMED: [(&str, &str); 3] = [("Dbxref", "db_xref"), ("Note", "note"), ("Name", "name")];

fn qualifiers(record: &gff::Record) -> Qualifiers {
    let mut qualifiers = Qualifiers::new();
    for (key, values) in record.attributes().iter_all() {
        let key = RENAMED
            .iter()
            .find(|(from, _)| *from == key.as_str())
            .map(|(_, to)| *to)
            .unwrap_or(key.as_str());
        for value in values {
            qualifiers.push(key, value.as_str());
        }
    }
    qualifiers
}

fn is_true(
    record: &gff::Record,
    key: &str,
) -> bool {
    record
        .attributes()
        .get(key)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn interval(record: &gff::Record) -> anyhow::Result<Interval> {
    let strand = record.strand().map(Strand::from).unwrap_or_default();
    let start = PosType::try_from(record.start().saturating_sub(1))?;
    let end = PosType::try_from(*record.end())?;
    Ok(Interval::try_new(record.seqname(), start, end, strand)?)
}

/// Builds one annotation from the lines of a (possibly split) feature.
fn annotation(lines: &[gff::Record]) -> anyhow::Result<Annotation> {
    let Some(first) = lines.first()
    else {
        anyhow::bail!("feature without lines");
    };
    let kind = FeatureKind::from_str(first.feature_type()).unwrap_or_else(|never| match never {});

    let mut intervals: Vec<Interval> = lines.iter().map(interval).try_collect()?;
    intervals.sort_by_key(|i| i.start());
    let minus = intervals.iter().all(|i| i.strand().is_minus());
    if minus {
        intervals.reverse();
    }

    let left = lines
        .iter()
        .any(|l| l.attributes().contains_key("start_range"));
    let right = lines
        .iter()
        .any(|l| l.attributes().contains_key("end_range"));
    let (left, right) = if is_true(first, "partial") && !left && !right {
        (true, true)
    }
    else {
        (left, right)
    };
    let (partial_start, partial_stop) = if minus { (right, left) } else { (left, right) };

    let location = Location::new(intervals)?
        .with_partial_start(partial_start)
        .with_partial_stop(partial_stop);
    let qualifiers = qualifiers(first);
    let comment = qualifiers.first("note").map(str::to_owned);

    Ok(Annotation::new(kind, location)
        .with_pseudo(is_true(first, "pseudo") || first.feature_type() == "pseudogene")
        .with_comment(comment)
        .with_qualifiers(qualifiers))
}

fn source(region: &gff::Record) -> Descriptor {
    let mut qualifiers = qualifiers(region);
    if !qualifiers.contains("taxname") {
        if let Some(organism) = qualifiers.first("organism").map(str::to_owned) {
            qualifiers.push("taxname", organism);
        }
    }
    Descriptor::new(DescriptorKind::Source).with_qualifiers(qualifiers)
}

/// Reads GFF3 into a tree named `name`.
pub fn read_gff<R: Read>(
    reader: R,
    name: &str,
) -> anyhow::Result<RecordTree> {
    let mut reader = gff::Reader::new(reader, gff::GffType::GFF3);

    // seqid -> feature key -> lines
    let mut sequences: IndexMap<String, IndexMap<String, Vec<gff::Record>>> = IndexMap::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let key = match record.attributes().get("ID") {
            Some(id) => format!("{}\t{}", record.feature_type(), id),
            None => format!("line\t{}", line),
        };
        sequences
            .entry(record.seqname().to_owned())
            .or_default()
            .entry(key)
            .or_default()
            .push(record);
    }

    let mut tree = RecordTree::new(name);
    let root = tree.root();
    for (seqid, features) in sequences.iter() {
        let region = features
            .values()
            .flatten()
            .find(|r| FeatureKind::from_str(r.feature_type()).ok() == Some(FeatureKind::Source));
        let mut record = Record::new(seqid.as_str(), MolType::Nucleotide);
        if let Some(region) = region {
            record = record.with_length(PosType::try_from(*region.end())?);
            if region
                .attributes()
                .get("completeness")
                .is_some_and(|c| c == "complete")
            {
                record = record.with_completeness(Completeness::Complete);
            }
        }
        let node = tree.add_record(root, record)?;
        if let Some(region) = region {
            tree.add_descriptor(node, source(region))?;
        }

        for lines in features.values() {
            let is_region = lines
                .first()
                .is_some_and(|r| FeatureKind::from_str(r.feature_type()).ok() == Some(FeatureKind::Source));
            if is_region {
                continue;
            }
            tree.add_annotation(node, annotation(lines)?)?;
        }
        debug!("Loaded {} with {} features", seqid, features.len());
    }
    info!("Read {} sequences from GFF", sequences.len());
    Ok(tree)
}

pub fn read_gff_file<P: AsRef<Path>>(path: P) -> anyhow::Result<RecordTree> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gff".to_owned());
    read_gff(std::fs::File::open(path)?, &name)
}
