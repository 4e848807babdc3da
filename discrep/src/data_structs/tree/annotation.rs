use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::coords::Location;
use crate::data_structs::enums::{
    DescriptorKind,
    FeatureKind,
};
use crate::{
    getter_fn,
    with_field_fn,
};

/// Multi-valued named attributes, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualifiers(IndexMap<String, Vec<String>>);

impl Qualifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// First value of `key`, if any.
    pub fn first(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.0.contains_key(key)
    }

    /// Appends a value to `key`.
    pub fn push<K: Into<String>, V: Into<String>>(
        &mut self,
        key: K,
        value: V,
    ) {
        self.0
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Qualifiers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut qualifiers = Qualifiers::new();
        for (k, v) in iter {
            qualifiers.push(k, v);
        }
        qualifiers
    }
}

/// Identity fields of a gene, used for explicit cross-reference matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneRef {
    pub locus:     Option<String>,
    pub allele:    Option<String>,
    pub desc:      Option<String>,
    pub maploc:    Option<String>,
    pub locus_tag: Option<String>,
    pub db_xrefs:  Vec<String>,
}

impl GeneRef {
    pub fn is_empty(&self) -> bool {
        self.locus.is_none()
            && self.allele.is_none()
            && self.desc.is_none()
            && self.maploc.is_none()
            && self.locus_tag.is_none()
            && self.db_xrefs.is_empty()
    }

    /// Reads identity fields from a gene feature's qualifiers.
    pub fn from_qualifiers(qualifiers: &Qualifiers) -> Self {
        let owned = |key: &str| qualifiers.first(key).map(str::to_owned);
        Self {
            locus:     owned("gene"),
            allele:    owned("allele"),
            desc:      owned("gene_desc"),
            maploc:    owned("map"),
            locus_tag: owned("locus_tag"),
            db_xrefs:  qualifiers
                .get("db_xref")
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }

    pub fn with_locus<S: Into<String>>(
        mut self,
        locus: S,
    ) -> Self {
        self.locus = Some(locus.into());
        self
    }

    pub fn with_locus_tag<S: Into<String>>(
        mut self,
        locus_tag: S,
    ) -> Self {
        self.locus_tag = Some(locus_tag.into());
        self
    }
}

/// Explicit link from a feature to its gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneXref {
    /// Points at the gene carrying these identity fields.
    Ref(GeneRef),
    /// The feature is declared to have no gene.
    Suppressed,
}

/// A feature on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    kind:       FeatureKind,
    location:   Location,
    #[serde(default)]
    qualifiers: Qualifiers,
    #[serde(default)]
    gene_xref:  Option<GeneXref>,
    #[serde(default)]
    pseudo:     bool,
    #[serde(default)]
    comment:    Option<String>,
}

impl Annotation {
    pub fn new(
        kind: FeatureKind,
        location: Location,
    ) -> Self {
        Self {
            kind,
            location,
            qualifiers: Qualifiers::default(),
            gene_xref: None,
            pseudo: false,
            comment: None,
        }
    }

    with_field_fn!(qualifiers, Qualifiers);

    with_field_fn!(gene_xref, Option<GeneXref>);

    with_field_fn!(pseudo, bool);

    with_field_fn!(comment, Option<String>);

    pub fn with_qualifier<K: Into<String>, V: Into<String>>(
        mut self,
        key: K,
        value: V,
    ) -> Self {
        self.qualifiers.push(key, value);
        self
    }

    getter_fn!(kind, FeatureKind);

    getter_fn!(location, Location);

    getter_fn!(qualifiers, Qualifiers);

    pub fn gene_xref(&self) -> Option<&GeneXref> {
        self.gene_xref.as_ref()
    }

    pub fn is_pseudo(&self) -> bool {
        self.pseudo || self.qualifiers.contains("pseudo")
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .or_else(|| self.qualifiers.first("note"))
    }

    /// Identity of this feature when it is a gene.
    pub fn gene_ref(&self) -> GeneRef {
        GeneRef::from_qualifiers(&self.qualifiers)
    }

    /// Short human label: locus tag, gene symbol or product, in that order.
    pub fn label(&self) -> &str {
        ["locus_tag", "gene", "product"]
            .iter()
            .find_map(|key| self.qualifiers.first(key))
            .unwrap_or("")
    }

    pub fn locator(&self) -> String {
        format!("{}\t{}\t{}", self.kind, self.label(), self.location)
    }
}

/// Metadata attached to an entry or a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    kind:       DescriptorKind,
    #[serde(default)]
    qualifiers: Qualifiers,
    #[serde(default)]
    text:       Option<String>,
}

impl Descriptor {
    pub fn new(kind: DescriptorKind) -> Self {
        Self {
            kind,
            qualifiers: Qualifiers::default(),
            text: None,
        }
    }

    /// Source descriptor naming an organism.
    pub fn source<S: Into<String>>(taxname: S) -> Self {
        Self::new(DescriptorKind::Source).with_qualifier("taxname", taxname)
    }

    with_field_fn!(qualifiers, Qualifiers);

    with_field_fn!(text, Option<String>);

    pub fn with_qualifier<K: Into<String>, V: Into<String>>(
        mut self,
        key: K,
        value: V,
    ) -> Self {
        self.qualifiers.push(key, value);
        self
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn is_source(&self) -> bool {
        self.kind == DescriptorKind::Source
    }

    getter_fn!(qualifiers, Qualifiers);

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn taxname(&self) -> Option<&str> {
        self.qualifiers.first("taxname")
    }
}
