use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::{
    IndexMap,
    IndexSet,
};
use log::debug;

use super::rule::{
    FamilyPass,
    Rule,
    RuleInfo,
};
use crate::config::ScanConfig;
use crate::data_structs::typedef::RuleName;
use crate::error::{
    DiscrepError,
    DiscrepResult,
};

/// Which registered object executes a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Single(usize),
    Family(usize),
}

/// Catalogue of every known rule, in registration order.
#[derive(Default, Clone)]
pub struct RuleRegistry {
    singles:   Vec<Arc<dyn Rule>>,
    passes:    Vec<Arc<dyn FamilyPass>>,
    catalogue: IndexMap<RuleName, (RuleInfo, Owner)>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(
        &mut self,
        info: RuleInfo,
        owner: Owner,
    ) -> DiscrepResult<()> {
        let name = ArcStr::from(info.name);
        if self.catalogue.contains_key(&name) {
            return Err(DiscrepError::Config(format!(
                "rule {} registered twice",
                name
            )));
        }
        self.catalogue.insert(name, (info, owner));
        Ok(())
    }

    pub fn register_rule<R: Rule + 'static>(
        &mut self,
        rule: R,
    ) -> DiscrepResult<()> {
        self.insert(rule.info().clone(), Owner::Single(self.singles.len()))?;
        self.singles.push(Arc::new(rule));
        Ok(())
    }

    pub fn register_family<P: FamilyPass + 'static>(
        &mut self,
        pass: P,
    ) -> DiscrepResult<()> {
        let owner = Owner::Family(self.passes.len());
        for info in pass.members() {
            if info.family != Some(pass.family()) || info.scope != pass.scope() {
                return Err(DiscrepError::Config(format!(
                    "rule {} does not match family {:?}",
                    info.name,
                    pass.family()
                )));
            }
        }
        for info in pass.members() {
            self.insert(info.clone(), owner)?;
        }
        self.passes.push(Arc::new(pass));
        Ok(())
    }

    pub fn info(
        &self,
        name: &str,
    ) -> Option<&RuleInfo> {
        self.catalogue.get(name).map(|(info, _)| info)
    }

    pub fn owner(
        &self,
        name: &str,
    ) -> Option<Owner> {
        self.catalogue.get(name).map(|(_, owner)| *owner)
    }

    pub fn rule(
        &self,
        idx: usize,
    ) -> Option<&dyn Rule> {
        self.singles.get(idx).map(Arc::as_ref)
    }

    pub fn pass(
        &self,
        idx: usize,
    ) -> Option<&dyn FamilyPass> {
        self.passes.get(idx).map(Arc::as_ref)
    }

    pub fn catalogue(&self) -> impl Iterator<Item = &RuleInfo> {
        self.catalogue.values().map(|(info, _)| info)
    }

    pub fn len(&self) -> usize {
        self.catalogue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogue.is_empty()
    }

    /// Resolves the names a scan will run, in catalogue order.
    ///
    /// Starts from `config.rules` when set, otherwise from every rule tagged
    /// for the report kind; adds `enable` and removes `disable`. Unknown
    /// names are an error.
    pub fn resolve_enabled(
        &self,
        config: &ScanConfig,
    ) -> DiscrepResult<IndexSet<RuleName>> {
        let known = |name: &String| -> DiscrepResult<()> {
            match self.catalogue.contains_key(name.as_str()) {
                true => Ok(()),
                false => Err(DiscrepError::UnknownRule(name.clone())),
            }
        };
        config
            .rules
            .iter()
            .flatten()
            .chain(config.enable.iter())
            .chain(config.disable.iter())
            .try_for_each(known)?;

        let wanted = |info: &RuleInfo| -> bool {
            let base = match &config.rules {
                Some(rules) => rules.iter().any(|r| r == info.name),
                None => info.enabled_for(config.kind),
            };
            let enabled = base || config.enable.iter().any(|r| r == info.name);
            enabled && !config.disable.iter().any(|r| r == info.name)
        };

        let enabled: IndexSet<RuleName> = self
            .catalogue
            .iter()
            .filter(|(_, (info, _))| wanted(info))
            .map(|(name, _)| name.clone())
            .collect();
        debug!("Resolved {} of {} rules", enabled.len(), self.len());
        Ok(enabled)
    }
}
