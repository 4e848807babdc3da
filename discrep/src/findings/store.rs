use arcstr::ArcStr;
use indexmap::{
    IndexMap,
    IndexSet,
};
use log::{
    trace,
    warn,
};

use super::codec::{
    self,
    CodecError,
};
use super::Finding;
use crate::data_structs::typedef::RuleName;
use crate::error::DiscrepError;

/// A finding as it was emitted: already typed, or packed and decoded later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredFinding {
    Typed(Finding),
    Packed { raw: String, arity: usize },
}

impl StoredFinding {
    pub fn decode(&self) -> Result<Finding, CodecError> {
        match self {
            StoredFinding::Typed(finding) => Ok(finding.clone()),
            StoredFinding::Packed { raw, arity } => codec::decode(raw, *arity),
        }
    }
}

/// Scan-scoped findings, keyed by rule and kept in emission order.
///
/// Also records rule failures so the report can tell a clean rule from one
/// that did not run to completion.
#[derive(Debug, Default)]
pub struct FindingStore {
    entries:  IndexMap<RuleName, Vec<StoredFinding>>,
    failures: IndexMap<RuleName, Vec<DiscrepError>>,
}

impl FindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(
        &mut self,
        rule: &str,
    ) -> &mut Vec<StoredFinding> {
        let idx = match self.entries.get_index_of(rule) {
            Some(idx) => idx,
            None => {
                self.entries
                    .insert_full(ArcStr::from(rule), Vec::new())
                    .0
            },
        };
        &mut self.entries[idx]
    }

    pub fn append(
        &mut self,
        rule: &str,
        finding: Finding,
    ) {
        self.bucket(rule)
            .push(StoredFinding::Typed(finding));
    }

    /// Stores a packed finding as-is; it is decoded at report time.
    pub fn append_packed<S: Into<String>>(
        &mut self,
        rule: &str,
        raw: S,
        arity: usize,
    ) {
        self.bucket(rule).push(StoredFinding::Packed {
            raw: raw.into(),
            arity,
        });
    }

    pub fn record_failure(
        &mut self,
        rule: &str,
        error: DiscrepError,
    ) {
        self.failures
            .entry(ArcStr::from(rule))
            .or_default()
            .push(error);
    }

    pub fn entries(
        &self,
        rule: &str,
    ) -> &[StoredFinding] {
        self.entries
            .get(rule)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn failures(
        &self,
        rule: &str,
    ) -> &[DiscrepError] {
        self.failures
            .get(rule)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rules that emitted at least one finding, in first-emission order.
    pub fn rules(&self) -> impl Iterator<Item = &RuleName> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.failures.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.failures.clear();
    }

    /// Moves everything from `other` behind the current contents.
    pub fn merge(
        &mut self,
        other: FindingStore,
    ) {
        for (rule, findings) in other.entries {
            self.entries
                .entry(rule)
                .or_default()
                .extend(findings);
        }
        for (rule, errors) in other.failures {
            self.failures
                .entry(rule)
                .or_default()
                .extend(errors);
        }
    }
}

/// Write handle given to rules during one invocation.
///
/// Findings for rules outside the enabled set are dropped, so a rule family
/// can compute all of its members and emit unconditionally.
pub struct FindingSink<'a> {
    store:   &'a mut FindingStore,
    enabled: &'a IndexSet<RuleName>,
    emitted: usize,
}

impl<'a> FindingSink<'a> {
    pub fn new(
        store: &'a mut FindingStore,
        enabled: &'a IndexSet<RuleName>,
    ) -> Self {
        Self {
            store,
            enabled,
            emitted: 0,
        }
    }

    pub fn is_enabled(
        &self,
        rule: &str,
    ) -> bool {
        self.enabled.contains(rule)
    }

    pub fn emit(
        &mut self,
        rule: &str,
        finding: Finding,
    ) {
        if !self.is_enabled(rule) {
            trace!("dropping finding for disabled rule {}", rule);
            return;
        }
        self.emitted += 1;
        self.store.append(rule, finding);
    }

    pub fn emit_packed<S: Into<String>>(
        &mut self,
        rule: &str,
        raw: S,
        arity: usize,
    ) {
        if !self.is_enabled(rule) {
            return;
        }
        self.emitted += 1;
        self.store.append_packed(rule, raw, arity);
    }

    /// Stores `finding` in packed form. A finding that cannot be packed is
    /// recorded as an encoding violation against `rule` instead.
    pub fn emit_encoded(
        &mut self,
        rule: &str,
        finding: &Finding,
    ) {
        if !self.is_enabled(rule) {
            return;
        }
        match codec::encode(finding) {
            Ok(raw) => {
                self.emitted += 1;
                self.store
                    .append_packed(rule, raw, finding.depth());
            },
            Err(reason) => {
                let err = DiscrepError::encoding(rule, format!("{:?}", finding), reason);
                warn!("{}", err);
                self.store.record_failure(rule, err);
            },
        }
    }

    /// Number of findings accepted through this sink.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}
