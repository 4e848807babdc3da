use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::Arc;

use rstest::{
    fixture,
    rstest,
};

use super::*;
use crate::config::{
    ReportKind,
    ScanConfig,
};
use crate::data_structs::tree::{
    Descriptor,
    Record,
    RecordTree,
};
use crate::data_structs::MolType;
use crate::error::DiscrepError;
use crate::findings::{
    Finding,
    FindingSink,
    FindingStore,
};
use crate::report::ItemStatus;

static PAIR_MEMBERS: [RuleInfo; 3] = [
    RuleInfo::new("PAIR_A", "a", "[n] a", RuleScope::Record).with_family(RuleFamily::GenePairs),
    RuleInfo::new("PAIR_B", "b", "[n] b", RuleScope::Record).with_family(RuleFamily::GenePairs),
    RuleInfo::new("PAIR_C", "c", "[n] c", RuleScope::Record).with_family(RuleFamily::GenePairs),
];

/// Family pass that counts its executions and flags every record for
/// every member.
struct CountingPass {
    runs: Arc<AtomicUsize>,
}

impl FamilyPass for CountingPass {
    fn family(&self) -> RuleFamily {
        RuleFamily::GenePairs
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Record
    }

    fn members(&self) -> &[RuleInfo] {
        &PAIR_MEMBERS
    }

    fn run_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        for member in PAIR_MEMBERS.iter() {
            sink.emit(member.name, Finding::new(view.id()));
        }
        Ok(())
    }
}

struct Echo;

impl Echo {
    const INFO: RuleInfo = RuleInfo::new("ECHO", "Echo", "[n] record[s]", RuleScope::Record);
}

impl Rule for Echo {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        let sources = view.descriptors().count();
        sink.emit(
            Self::INFO.name,
            Finding::keyed([format!("{} sources", sources)], view.id()),
        );
        Ok(())
    }
}

/// Emits one finding, then fails on records named `bad`.
struct Flaky;

impl Flaky {
    const INFO: RuleInfo = RuleInfo::new("FLAKY", "Flaky", "[n] flaky", RuleScope::Record);
}

impl Rule for Flaky {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        sink.emit(Self::INFO.name, Finding::new(view.id()));
        if view.id() == "bad" {
            anyhow::bail!("cannot handle record");
        }
        Ok(())
    }
}

struct Panicky;

impl Panicky {
    const INFO: RuleInfo = RuleInfo::new("PANICKY", "Panicky", "[n] panic", RuleScope::Record);
}

impl Rule for Panicky {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_record(
        &self,
        _ctx: &ScanContext<'_>,
        view: &RecordView<'_>,
        _sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        if view.id() == "bad" {
            panic!("index out of bounds");
        }
        Ok(())
    }
}

struct CountEntries {
    runs: Arc<AtomicUsize>,
}

impl CountEntries {
    const INFO: RuleInfo = RuleInfo::new("ENTRY", "Entry", "[n] entry", RuleScope::Entry)
        .with_kinds(ONCALLER);
}

impl Rule for CountEntries {
    fn info(&self) -> &RuleInfo {
        &Self::INFO
    }

    fn check_entry(
        &self,
        ctx: &ScanContext<'_>,
        sink: &mut FindingSink<'_>,
    ) -> anyhow::Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let root = ctx.tree.root();
        sink.emit(Self::INFO.name, Finding::new(ctx.tree.locator(root)));
        Ok(())
    }
}

struct Harness {
    registry:   RuleRegistry,
    pair_runs:  Arc<AtomicUsize>,
    entry_runs: Arc<AtomicUsize>,
}

#[fixture]
fn harness() -> Harness {
    let pair_runs = Arc::new(AtomicUsize::new(0));
    let entry_runs = Arc::new(AtomicUsize::new(0));
    let mut registry = RuleRegistry::new();
    registry.register_rule(Echo).unwrap();
    registry
        .register_family(CountingPass {
            runs: pair_runs.clone(),
        })
        .unwrap();
    registry.register_rule(Flaky).unwrap();
    registry.register_rule(Panicky).unwrap();
    registry
        .register_rule(CountEntries {
            runs: entry_runs.clone(),
        })
        .unwrap();
    Harness {
        registry,
        pair_runs,
        entry_runs,
    }
}

/// root (source) -> [r1, set (source) -> [r2, bad], r3]
#[fixture]
fn tree() -> RecordTree {
    let mut tree = RecordTree::new("submission");
    let root = tree.root();
    tree.add_descriptor(root, Descriptor::source("Escherichia coli"))
        .unwrap();
    tree.add_record(root, Record::new("r1", MolType::Nucleotide))
        .unwrap();
    let set = tree.add_entry(root, "set").unwrap();
    tree.add_descriptor(set, Descriptor::source("Escherichia coli K-12"))
        .unwrap();
    tree.add_record(set, Record::new("r2", MolType::Nucleotide))
        .unwrap();
    tree.add_record(set, Record::new("bad", MolType::Nucleotide))
        .unwrap();
    tree.add_record(root, Record::new("r3", MolType::Protein))
        .unwrap();
    tree
}

fn only(names: &[&str]) -> ScanConfig {
    ScanConfig::default().only(names.iter().copied())
}

#[rstest]
fn test_family_pass_runs_once_per_record(
    harness: Harness,
    tree: RecordTree,
) {
    let scanner = Scanner::new(harness.registry, only(&["PAIR_A", "PAIR_B", "PAIR_C"])).unwrap();
    let (summary, report) = scanner.scan(&tree);

    assert_eq!(summary.records, 4);
    assert_eq!(summary.visited, 4);
    assert_eq!(harness.pair_runs.load(Ordering::SeqCst), 4);
    assert_eq!(report.len(), 3);
    for item in report.iter() {
        assert_eq!(item.count(), 4);
        assert_eq!(item.locators, vec!["r1", "r2", "bad", "r3"]);
    }
}

#[rstest]
fn test_disabled_member_neither_runs_nor_reports(
    harness: Harness,
    tree: RecordTree,
) {
    let scanner = Scanner::new(harness.registry, only(&["PAIR_B"])).unwrap();
    let mut store = FindingStore::new();
    scanner.visit(&tree, &mut store);

    assert_eq!(harness.pair_runs.load(Ordering::SeqCst), 4);
    assert!(store.entries("PAIR_A").is_empty());
    assert!(store.entries("PAIR_C").is_empty());
    assert_eq!(store.entries("PAIR_B").len(), 4);

    let report = scanner.build_report(&store);
    assert_eq!(
        report
            .iter()
            .map(|i| i.setting_name.as_str())
            .collect::<Vec<_>>(),
        vec!["PAIR_B"]
    );
}

#[rstest]
fn test_family_without_enabled_members_is_skipped(
    harness: Harness,
    tree: RecordTree,
) {
    let scanner = Scanner::new(harness.registry, only(&["ECHO"])).unwrap();
    scanner.scan(&tree);
    assert_eq!(harness.pair_runs.load(Ordering::SeqCst), 0);
}

#[rstest]
fn test_inherited_descriptors_reach_rules(
    harness: Harness,
    tree: RecordTree,
) {
    let scanner = Scanner::new(harness.registry, only(&["ECHO"])).unwrap();
    let (_, report) = scanner.scan(&tree);
    let echo = &report[0];

    assert_eq!(echo.subcategory("1 sources").unwrap().locators, vec![
        "r1", "r3"
    ]);
    assert_eq!(echo.subcategory("2 sources").unwrap().locators, vec![
        "r2", "bad"
    ]);
}

#[rstest]
fn test_rule_error_is_isolated(
    harness: Harness,
    tree: RecordTree,
) {
    let scanner = Scanner::new(harness.registry, only(&["ECHO", "FLAKY"])).unwrap();
    let (summary, report) = scanner.scan(&tree);

    assert_eq!(summary.visited, 4);
    assert_eq!(summary.failed_rules, vec!["FLAKY"]);

    let echo = &report[0];
    assert_eq!(echo.status, ItemStatus::Flagged);
    assert_eq!(echo.count(), 4);

    let flaky = &report[1];
    assert_eq!(flaky.status, ItemStatus::Failed);
    assert_eq!(flaky.count(), 4);
    assert_eq!(flaky.errors.len(), 1);
    assert!(flaky.errors[0].contains("bad: cannot handle record"));
}

#[rstest]
fn test_panic_is_isolated(
    harness: Harness,
    tree: RecordTree,
) {
    let scanner = Scanner::new(harness.registry, only(&["PANICKY", "ECHO"])).unwrap();
    let (summary, report) = scanner.scan(&tree);

    assert_eq!(summary.visited, 4);
    assert_eq!(summary.failed_rules, vec!["PANICKY"]);

    let panicky = report
        .iter()
        .find(|i| i.setting_name == "PANICKY")
        .unwrap();
    assert_eq!(panicky.status, ItemStatus::Failed);
    assert!(panicky.locators.is_empty());
    assert!(panicky.errors[0].contains("panicked: index out of bounds"));
    assert!(panicky
        .description
        .ends_with("check did not complete"));
}

#[rstest]
fn test_entry_rules_run_once(
    harness: Harness,
    tree: RecordTree,
) {
    let config = ScanConfig::default().with_kind(ReportKind::Oncaller);
    let scanner = Scanner::new(harness.registry, config).unwrap();
    let (_, report) = scanner.scan(&tree);

    assert_eq!(harness.entry_runs.load(Ordering::SeqCst), 1);
    let entry = report
        .iter()
        .find(|i| i.setting_name == "ENTRY")
        .unwrap();
    assert_eq!(entry.locators, vec!["submission"]);
}

#[rstest]
fn test_repeated_visits_are_identical(
    harness: Harness,
    tree: RecordTree,
) {
    let scanner = Scanner::new(harness.registry, only(&["PAIR_A", "ECHO", "FLAKY"])).unwrap();
    let (_, first) = scanner.scan(&tree);
    let (_, second) = scanner.scan(&tree);

    assert_eq!(first, second);
    assert_eq!(harness.pair_runs.load(Ordering::SeqCst), 8);
}

#[rstest]
fn test_parallel_matches_sequential(
    harness: Harness,
    tree: RecordTree,
) {
    let names = ["ECHO", "PAIR_A", "PAIR_C", "FLAKY", "PANICKY"];
    let sequential = Scanner::new(harness.registry.clone(), only(&names)).unwrap();
    let parallel = Scanner::new(harness.registry, only(&names).with_parallel(true)).unwrap();

    let (_, expected) = sequential.scan(&tree);
    let (summary, actual) = parallel.scan(&tree);

    assert_eq!(summary.visited, 4);
    assert_eq!(expected, actual);
    assert_eq!(harness.pair_runs.load(Ordering::SeqCst), 8);
}

#[rstest]
fn test_cancelled_scan_stops_at_record_boundary(
    harness: Harness,
    tree: RecordTree,
) {
    let config = ScanConfig::default().with_kind(ReportKind::Oncaller);
    let scanner = Scanner::new(harness.registry, config).unwrap();
    scanner.cancel_handle().store(true, Ordering::SeqCst);

    let (summary, report) = scanner.scan(&tree);
    assert!(summary.cancelled);
    assert_eq!(summary.visited, 0);
    assert_eq!(harness.entry_runs.load(Ordering::SeqCst), 0);
    assert!(report.iter().all(|item| item.is_clean()));
}

#[rstest]
fn test_progress_reports_each_record(
    harness: Harness,
    tree: RecordTree,
) {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let scanner = Scanner::new(harness.registry, only(&["ECHO"]))
        .unwrap()
        .with_progress(move |done| {
            counter.fetch_max(done, Ordering::SeqCst);
        });
    scanner.scan(&tree);
    assert_eq!(seen.load(Ordering::SeqCst), 4);
}

// --- Registry ---

#[rstest]
fn test_resolve_enabled_by_kind(harness: Harness) {
    let registry = harness.registry;

    let defaults = registry
        .resolve_enabled(&ScanConfig::default())
        .unwrap();
    assert!(!defaults.contains("ENTRY"));
    assert!(defaults.contains("ECHO"));

    let oncaller = registry
        .resolve_enabled(&ScanConfig::default().with_kind(ReportKind::Oncaller))
        .unwrap();
    assert!(oncaller.contains("ENTRY"));

    let adjusted = registry
        .resolve_enabled(
            &ScanConfig::default()
                .with_enable(vec!["ENTRY".into()])
                .with_disable(vec!["ECHO".into(), "PANICKY".into()]),
        )
        .unwrap();
    assert!(adjusted.contains("ENTRY"));
    assert!(!adjusted.contains("ECHO"));
    assert!(!adjusted.contains("PANICKY"));
    // Catalogue order is kept.
    assert_eq!(
        adjusted
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>(),
        vec!["PAIR_A", "PAIR_B", "PAIR_C", "FLAKY", "ENTRY"]
    );
}

#[rstest]
fn test_unknown_rule_is_rejected(harness: Harness) {
    let err = Scanner::new(harness.registry, only(&["NOPE"])).err();
    assert!(matches!(err, Some(DiscrepError::UnknownRule(name)) if name == "NOPE"));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut registry = RuleRegistry::new();
    registry.register_rule(Echo).unwrap();
    assert!(matches!(
        registry.register_rule(Echo),
        Err(DiscrepError::Config(_))
    ));
    assert_eq!(registry.len(), 1);
}

#[rstest]
fn test_once_guard(tree: RecordTree) {
    let node = tree.records()[0].id;
    let guard = OnceGuard::new();

    assert!(guard.claim(RuleFamily::LocusTags, node));
    assert!(!guard.claim(RuleFamily::LocusTags, node));
    assert!(guard.claim(RuleFamily::Taxonomy, node));
    assert!(guard.is_claimed(RuleFamily::LocusTags, node));

    guard.reset();
    assert!(!guard.is_claimed(RuleFamily::LocusTags, node));
}

// --- Lookup ---

#[test]
fn test_static_lookup() {
    let record = TaxonRecord {
        taxname: "Escherichia coli".into(),
        taxid:   562,
        lineage: None,
    };
    let lookup = StaticLookup::new().with_record("Escherichia coli", record.clone());

    assert_eq!(lookup.lookup("escherichia COLI").unwrap(), Some(record));
    assert_eq!(lookup.lookup("Bacillus").unwrap(), None);
    assert!(matches!(
        UnavailableLookup.lookup("x"),
        Err(DiscrepError::LookupUnavailable { .. })
    ));
}

#[test]
fn test_static_lookup_from_json() {
    let json = r#"[{"taxname": "Homo sapiens", "taxid": 9606}]"#;
    let lookup = StaticLookup::from_reader(json.as_bytes()).unwrap();
    assert_eq!(lookup.len(), 1);
    assert_eq!(lookup.lookup("homo sapiens").unwrap().unwrap().taxid, 9606);
}
