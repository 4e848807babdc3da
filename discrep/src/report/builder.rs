use indexmap::{
    IndexMap,
    IndexSet,
};
use itertools::Itertools;
use log::{
    debug,
    warn,
};

use super::template::describe;
use super::{
    fatal,
    ItemStatus,
    ReportItem,
};
use crate::data_structs::typedef::RuleName;
use crate::engine::{
    RuleInfo,
    RuleRegistry,
};
use crate::error::DiscrepError;
use crate::findings::{
    Finding,
    FindingStore,
    StoredFinding,
};

/// Builds report trees for the enabled rules of a registry.
pub struct ReportBuilder<'a> {
    registry: &'a RuleRegistry,
    enabled:  &'a IndexSet<RuleName>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(
        registry: &'a RuleRegistry,
        enabled: &'a IndexSet<RuleName>,
    ) -> Self {
        Self { registry, enabled }
    }

    /// One item per enabled rule, in catalogue order, with fatal tagging
    /// applied.
    pub fn build_all(
        &self,
        store: &FindingStore,
    ) -> Vec<ReportItem> {
        let mut items = self
            .enabled
            .iter()
            .filter_map(|name| self.registry.info(name))
            .map(|info| self.build(info, store))
            .collect_vec();
        fatal::apply(&mut items);
        items
    }

    pub fn build(
        &self,
        info: &RuleInfo,
        store: &FindingStore,
    ) -> ReportItem {
        let name = info.name;
        let mut errors = store
            .failures(name)
            .iter()
            .map(ToString::to_string)
            .collect_vec();

        let mut findings = Vec::with_capacity(store.entries(name).len());
        for stored in store.entries(name) {
            match stored.decode() {
                Ok(finding) => findings.push(finding),
                Err(reason) => {
                    let raw = match stored {
                        StoredFinding::Packed { raw, .. } => raw.clone(),
                        StoredFinding::Typed(finding) => format!("{:?}", finding),
                    };
                    let err = DiscrepError::encoding(name, raw, reason);
                    warn!("{}", err);
                    errors.push(err.to_string());
                },
            }
        }
        let findings = findings.iter().collect_vec();
        let locators = unique_locators(&findings);
        debug!(
            "Building report for {}: {} findings, {} objects",
            name,
            findings.len(),
            locators.len()
        );

        let status = if !errors.is_empty() {
            ItemStatus::Failed
        }
        else if findings.is_empty() {
            ItemStatus::Clean
        }
        else {
            ItemStatus::Flagged
        };
        let description = match (status, locators.is_empty()) {
            (ItemStatus::Clean, _) => format!("{}: no discrepancies found", info.title),
            (ItemStatus::Failed, true) => format!("{}: check did not complete", info.title),
            _ => describe(info.summary, locators.len()),
        };

        ReportItem {
            setting_name: name.to_owned(),
            key: None,
            description,
            status,
            fatal: false,
            subcategories: group(name, &findings, 0),
            locators,
            errors,
        }
    }
}

fn unique_locators(findings: &[&Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|f| f.locator.as_str())
        .unique()
        .map(str::to_owned)
        .collect()
}

/// Groups findings on their key at `level`, recursing into deeper keys.
/// Findings without a key at this level stay with the parent.
fn group(
    setting_name: &str,
    findings: &[&Finding],
    level: usize,
) -> Vec<ReportItem> {
    let mut groups: IndexMap<&str, Vec<&Finding>> = IndexMap::new();
    for finding in findings {
        if let Some(key) = finding.class_keys.get(level) {
            groups
                .entry(key.as_str())
                .or_default()
                .push(*finding);
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| {
            let locators = unique_locators(&members);
            ReportItem {
                setting_name:  setting_name.to_owned(),
                key:           Some(key.to_owned()),
                description:   describe(key, locators.len()),
                status:        ItemStatus::Flagged,
                fatal:         false,
                subcategories: group(setting_name, &members, level + 1),
                locators,
                errors:        Vec::new(),
            }
        })
        .collect()
}
