use std::io::Read;

use hashbrown::HashMap;
use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    DiscrepError,
    DiscrepResult,
};

/// What a taxonomy service knows about an organism name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonRecord {
    /// Canonical scientific name.
    pub taxname: String,
    pub taxid:   u32,
    #[serde(default)]
    pub lineage: Option<String>,
}

/// Organism name resolution, injected into a scan.
///
/// `Ok(None)` means the service answered and does not know the name; an
/// `Err` means it could not answer at all.
pub trait TaxonomyLookup: Send + Sync {
    fn lookup(
        &self,
        query: &str,
    ) -> DiscrepResult<Option<TaxonRecord>>;
}

/// In-memory lookup table keyed by lowercased name.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    records: HashMap<String, TaxonRecord>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: AsRef<str>>(
        &mut self,
        name: S,
        record: TaxonRecord,
    ) {
        self.records
            .insert(name.as_ref().to_lowercase(), record);
    }

    pub fn with_record<S: AsRef<str>>(
        mut self,
        name: S,
        record: TaxonRecord,
    ) -> Self {
        self.insert(name, record);
        self
    }

    /// Reads a JSON array of [`TaxonRecord`]s, each indexed by its own name.
    pub fn from_reader<R: Read>(reader: R) -> DiscrepResult<Self> {
        let records: Vec<TaxonRecord> = serde_json::from_reader(reader)?;
        let mut lookup = Self::new();
        for record in records {
            lookup.insert(record.taxname.clone(), record);
        }
        Ok(lookup)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TaxonomyLookup for StaticLookup {
    fn lookup(
        &self,
        query: &str,
    ) -> DiscrepResult<Option<TaxonRecord>> {
        Ok(self.records.get(&query.to_lowercase()).cloned())
    }
}

/// Lookup used when no service is configured; every query fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLookup;

impl TaxonomyLookup for UnavailableLookup {
    fn lookup(
        &self,
        query: &str,
    ) -> DiscrepResult<Option<TaxonRecord>> {
        Err(DiscrepError::LookupUnavailable {
            query:  query.to_owned(),
            reason: "no taxonomy service configured".to_owned(),
        })
    }
}
