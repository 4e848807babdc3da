use std::any::Any;
use std::panic::{
    self,
    AssertUnwindSafe,
};
use std::sync::atomic::{
    AtomicBool,
    AtomicUsize,
    Ordering,
};
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexSet;
use log::{
    debug,
    info,
    trace,
    warn,
};
use rayon::prelude::*;
use serde::Serialize;

use super::guard::OnceGuard;
use super::lookup::{
    TaxonomyLookup,
    UnavailableLookup,
};
use super::registry::{
    Owner,
    RuleRegistry,
};
use super::rule::{
    RecordView,
    RuleScope,
    ScanContext,
};
use crate::config::ScanConfig;
use crate::data_structs::tree::{
    NodeId,
    RecordScope,
    RecordTree,
};
use crate::data_structs::typedef::RuleName;
use crate::error::{
    DiscrepError,
    DiscrepResult,
};
use crate::findings::{
    FindingSink,
    FindingStore,
};
use crate::report::{
    ReportBuilder,
    ReportItem,
};
use crate::utils::{
    n_threads,
    THREAD_POOL,
};

pub type ProgressFn = dyn Fn(usize) + Send + Sync;

/// Outcome of one [`Scanner::visit`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Records in the tree.
    pub records:      usize,
    /// Records the rules were run on.
    pub visited:      usize,
    /// Whether the scan stopped early on cancellation or deadline.
    pub cancelled:    bool,
    pub failed_rules: Vec<RuleName>,
}

/// Runs the enabled rules of a registry over record trees.
pub struct Scanner {
    registry: RuleRegistry,
    config:   ScanConfig,
    enabled:  IndexSet<RuleName>,
    lookup:   Arc<dyn TaxonomyLookup>,
    guard:    OnceGuard,
    cancel:   Arc<AtomicBool>,
    progress: Option<Arc<ProgressFn>>,
}

impl Scanner {
    pub fn new(
        registry: RuleRegistry,
        config: ScanConfig,
    ) -> DiscrepResult<Self> {
        let enabled = registry.resolve_enabled(&config)?;
        Ok(Self {
            registry,
            config,
            enabled,
            lookup: Arc::new(UnavailableLookup),
            guard: OnceGuard::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        })
    }

    pub fn with_lookup<L: TaxonomyLookup + 'static>(
        mut self,
        lookup: L,
    ) -> Self {
        self.lookup = Arc::new(lookup);
        self
    }

    /// Called with the number of records finished so far.
    pub fn with_progress<F: Fn(usize) + Send + Sync + 'static>(
        mut self,
        callback: F,
    ) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Flag that stops the scan at the next record boundary when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn enabled(&self) -> &IndexSet<RuleName> {
        &self.enabled
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Forgets which family passes already ran.
    pub fn reset(&self) {
        self.guard.reset();
    }

    /// Walks `tree` and collects findings into `store`, which is cleared
    /// first.
    pub fn visit(
        &self,
        tree: &RecordTree,
        store: &mut FindingStore,
    ) -> ScanSummary {
        self.reset();
        store.clear();

        let ctx = ScanContext {
            tree,
            config: &self.config,
            lookup: self.lookup.as_ref(),
        };
        let scopes = tree.records();
        let started = Instant::now();
        let done = AtomicUsize::new(0);
        let stopped = AtomicBool::new(false);
        info!(
            "Scanning {} records with {} rules",
            scopes.len(),
            self.enabled.len()
        );

        let visit_one = |scope: &RecordScope| -> Option<FindingStore> {
            if self.should_stop(started) {
                stopped.store(true, Ordering::Relaxed);
                return None;
            }
            let mut local = FindingStore::new();
            self.run_record(&ctx, scope, &mut local);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = &self.progress {
                progress(finished);
            }
            Some(local)
        };

        let shards: Vec<Option<FindingStore>> = if self.config.parallel {
            debug!("Scanning in parallel on {} threads", n_threads());
            THREAD_POOL.install(|| scopes.par_iter().map(visit_one).collect())
        }
        else {
            let mut shards = Vec::with_capacity(scopes.len());
            for scope in scopes.iter() {
                let shard = visit_one(scope);
                let halt = shard.is_none();
                shards.push(shard);
                if halt {
                    break;
                }
            }
            shards
        };
        for shard in shards.into_iter().flatten() {
            store.merge(shard);
        }

        let cancelled = stopped.load(Ordering::Relaxed);
        if cancelled {
            warn!(
                "{}",
                DiscrepError::Cancelled(done.load(Ordering::Relaxed))
            );
        }
        else {
            self.run_entry(&ctx, store);
        }

        let failed_rules: Vec<RuleName> = self
            .enabled
            .iter()
            .filter(|name| !store.failures(name).is_empty())
            .cloned()
            .collect();
        let summary = ScanSummary {
            records: scopes.len(),
            visited: done.load(Ordering::Relaxed),
            cancelled,
            failed_rules,
        };
        info!(
            "Scan finished: {} findings, {} failed rules",
            store.len(),
            summary.failed_rules.len()
        );
        summary
    }

    /// Turns the collected findings into one report item per enabled rule.
    pub fn build_report(
        &self,
        store: &FindingStore,
    ) -> Vec<ReportItem> {
        ReportBuilder::new(&self.registry, &self.enabled).build_all(store)
    }

    /// Visits `tree` with a fresh store and builds the report.
    pub fn scan(
        &self,
        tree: &RecordTree,
    ) -> (ScanSummary, Vec<ReportItem>) {
        let mut store = FindingStore::new();
        let summary = self.visit(tree, &mut store);
        (summary, self.build_report(&store))
    }

    fn should_stop(
        &self,
        started: Instant,
    ) -> bool {
        if self.cancel.load(Ordering::Relaxed) {
            return true;
        }
        self.config
            .deadline()
            .is_some_and(|deadline| started.elapsed() > deadline)
    }

    /// Enabled members of the family run by pass `idx`.
    fn family_owners(
        &self,
        idx: usize,
    ) -> Vec<&str> {
        self.registry
            .pass(idx)
            .map(|pass| {
                pass.members()
                    .iter()
                    .map(|info| info.name)
                    .filter(|name| self.enabled.contains(*name))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn run_record(
        &self,
        ctx: &ScanContext<'_>,
        scope: &RecordScope,
        store: &mut FindingStore,
    ) {
        let Some(record) = ctx.tree.record(scope.id)
        else {
            return;
        };
        let view = RecordView {
            node: scope.id,
            record,
            inherited: &scope.inherited,
            tree: ctx.tree,
        };
        trace!("Visiting record {}", record.id());

        for name in self.enabled.iter() {
            match self.registry.owner(name) {
                Some(Owner::Single(idx)) => {
                    let Some(rule) = self.registry.rule(idx)
                    else {
                        continue;
                    };
                    if rule.info().scope != RuleScope::Record {
                        continue;
                    }
                    self.invoke(&[name.as_str()], view.id(), store, |sink| {
                        rule.check_record(ctx, &view, sink)
                    });
                },
                Some(Owner::Family(idx)) => {
                    let Some(pass) = self.registry.pass(idx)
                    else {
                        continue;
                    };
                    if pass.scope() != RuleScope::Record
                        || !self.guard.claim(pass.family(), scope.id)
                    {
                        continue;
                    }
                    debug!("Running {:?} pass on {}", pass.family(), view.id());
                    let owners = self.family_owners(idx);
                    self.invoke(&owners, view.id(), store, |sink| {
                        pass.run_record(ctx, &view, sink)
                    });
                },
                None => {},
            }
        }
    }

    fn run_entry(
        &self,
        ctx: &ScanContext<'_>,
        store: &mut FindingStore,
    ) {
        let root: NodeId = ctx.tree.root();
        let locator = ctx.tree.locator(root).to_owned();

        for name in self.enabled.iter() {
            match self.registry.owner(name) {
                Some(Owner::Single(idx)) => {
                    let Some(rule) = self.registry.rule(idx)
                    else {
                        continue;
                    };
                    if rule.info().scope != RuleScope::Entry {
                        continue;
                    }
                    self.invoke(&[name.as_str()], &locator, store, |sink| {
                        rule.check_entry(ctx, sink)
                    });
                },
                Some(Owner::Family(idx)) => {
                    let Some(pass) = self.registry.pass(idx)
                    else {
                        continue;
                    };
                    if pass.scope() != RuleScope::Entry
                        || !self.guard.claim(pass.family(), root)
                    {
                        continue;
                    }
                    debug!("Running {:?} pass on {}", pass.family(), locator);
                    let owners = self.family_owners(idx);
                    self.invoke(&owners, &locator, store, |sink| {
                        pass.run_entry(ctx, sink)
                    });
                },
                None => {},
            }
        }
    }

    /// Runs one rule body, turning an error or a panic into a failure
    /// recorded against every owner.
    fn invoke<F>(
        &self,
        owners: &[&str],
        locator: &str,
        store: &mut FindingStore,
        body: F,
    ) where
        F: FnOnce(&mut FindingSink<'_>) -> anyhow::Result<()>, {
        let outcome = {
            let mut sink = FindingSink::new(store, &self.enabled);
            panic::catch_unwind(AssertUnwindSafe(|| body(&mut sink)))
        };
        let message = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => format!("{:#}", err),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };
        for owner in owners {
            warn!("Rule {} failed on {}: {}", owner, locator, message);
            store.record_failure(
                owner,
                DiscrepError::rule_execution(owner, format!("{}: {}", locator, message)),
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    }
    else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    }
    else {
        "unknown panic".to_string()
    }
}
