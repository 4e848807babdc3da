use std::convert::Infallible;
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

use arcstr::ArcStr;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default)]
pub enum Strand {
    /// Forward strand.
    Forward,
    /// Reverse strand.
    Reverse,
    /// No strand.
    #[default]
    None,
}

impl Strand {
    pub fn is_minus(&self) -> bool {
        matches!(self, Strand::Reverse)
    }
}

impl FromStr for Strand {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Ok(Strand::None),
        }
    }
}

impl From<Strand> for Option<bool> {
    fn from(value: Strand) -> Option<bool> {
        match value {
            Strand::Forward => Some(true),
            Strand::Reverse => Some(false),
            Strand::None => None,
        }
    }
}

impl From<Option<bool>> for Strand {
    fn from(value: Option<bool>) -> Strand {
        match value {
            Some(true) => Strand::Forward,
            Some(false) => Strand::Reverse,
            None => Strand::None,
        }
    }
}

impl From<bio::bio_types::strand::Strand> for Strand {
    fn from(value: bio::bio_types::strand::Strand) -> Self {
        match value {
            bio::bio_types::strand::Strand::Forward => Strand::Forward,
            bio::bio_types::strand::Strand::Reverse => Strand::Reverse,
            bio::bio_types::strand::Strand::Unknown => Strand::None,
        }
    }
}

impl Display for Strand {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::None => write!(f, "."),
        }
    }
}

impl Serialize for Strand {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Molecule class of a record.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MolType {
    #[default]
    #[serde(alias = "dna", alias = "rna", alias = "na")]
    Nucleotide,
    #[serde(alias = "aa")]
    Protein,
}

impl MolType {
    pub fn is_nucleotide(&self) -> bool {
        matches!(self, MolType::Nucleotide)
    }
}

/// Whether a record claims to hold the complete molecule.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    Complete,
    Partial,
    #[default]
    Unknown,
}

/// Feature class of an annotation.
#[derive(Eq, Hash, PartialEq, Clone, Debug)]
pub enum FeatureKind {
    Gene,
    Cds,
    MRna,
    Exon,
    Intron,
    FivePrimeUtr,
    ThreePrimeUtr,
    RRna,
    TRna,
    Source,
    Other(ArcStr),
}

impl FeatureKind {
    /// Features expected to be governed by a gene.
    pub fn needs_gene(&self) -> bool {
        matches!(
            self,
            FeatureKind::Cds | FeatureKind::MRna | FeatureKind::RRna | FeatureKind::TRna
        )
    }

    pub fn is_utr(&self) -> bool {
        matches!(self, FeatureKind::FivePrimeUtr | FeatureKind::ThreePrimeUtr)
    }
}

impl FromStr for FeatureKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().as_str() {
            "gene" | "pseudogene" => FeatureKind::Gene,
            "cds" => FeatureKind::Cds,
            "mrna" => FeatureKind::MRna,
            "exon" => FeatureKind::Exon,
            "intron" => FeatureKind::Intron,
            "five_prime_utr" | "5'utr" => FeatureKind::FivePrimeUtr,
            "three_prime_utr" | "3'utr" => FeatureKind::ThreePrimeUtr,
            "rrna" => FeatureKind::RRna,
            "trna" => FeatureKind::TRna,
            "source" | "region" => FeatureKind::Source,
            _ => FeatureKind::Other(ArcStr::from(s)),
        };
        Ok(kind)
    }
}

impl Display for FeatureKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            FeatureKind::Gene => write!(f, "gene"),
            FeatureKind::Cds => write!(f, "CDS"),
            FeatureKind::MRna => write!(f, "mRNA"),
            FeatureKind::Exon => write!(f, "exon"),
            FeatureKind::Intron => write!(f, "intron"),
            FeatureKind::FivePrimeUtr => write!(f, "5'UTR"),
            FeatureKind::ThreePrimeUtr => write!(f, "3'UTR"),
            FeatureKind::RRna => write!(f, "rRNA"),
            FeatureKind::TRna => write!(f, "tRNA"),
            FeatureKind::Source => write!(f, "source"),
            FeatureKind::Other(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for FeatureKind {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FeatureKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Class of a descriptor.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Source,
    Title,
    Comment,
    MolInfo,
}
