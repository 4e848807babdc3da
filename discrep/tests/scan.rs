use std::io::Cursor;

use discrep::io::json::read_json;
use discrep::prelude::*;
use discrep::report::write_json;
use rstest::*;

mod common;
use common::{
    Defects,
    DemoSubmission,
};

#[fixture]
fn clean() -> DemoSubmission {
    DemoSubmission::new(4, 5)
}

#[fixture]
fn defective() -> DemoSubmission {
    DemoSubmission::new(4, 5).with_defects(Defects {
        orphan_cds:        true,
        overlapping_genes: true,
        missing_locus_tag: true,
        mixed_country:     true,
    })
}

fn find<'a>(
    report: &'a [ReportItem],
    name: &str,
) -> &'a ReportItem {
    report
        .iter()
        .find(|item| item.setting_name == name)
        .unwrap_or_else(|| panic!("no report item for {}", name))
}

#[rstest]
fn test_json_loader_builds_tree(clean: DemoSubmission) -> anyhow::Result<()> {
    let tree = read_json(Cursor::new(clean.to_json()))?;
    let records = tree.records();

    assert_eq!(records.len(), 4);
    let first = tree.record(records[0].id).unwrap();
    assert_eq!(first.id(), "seq1");
    assert_eq!(first.length(), 6000);
    assert_eq!(tree.annotations_of(records[0].id).count(), 10);
    // Only the root title descriptor is inherited.
    assert_eq!(records[0].inherited.len(), 1);
    Ok(())
}

#[rstest]
fn test_clean_submission(clean: DemoSubmission) -> anyhow::Result<()> {
    let tree = read_json(Cursor::new(clean.to_json()))?;
    let scanner = Scanner::new(standard_registry()?, ScanConfig::default())?;
    let (summary, report) = scanner.scan(&tree);

    assert_eq!(summary.visited, 4);
    assert!(!summary.cancelled);
    assert!(summary.failed_rules.is_empty());

    let flagged = report
        .iter()
        .filter(|item| !item.is_clean())
        .map(|item| item.setting_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(flagged, vec!["COUNT_NUCLEOTIDES", "DISC_SOURCE_QUALS_ASNDISC"]);
    assert!(report.iter().all(|item| !item.any_fatal()));
    Ok(())
}

#[rstest]
fn test_defective_submission(defective: DemoSubmission) -> anyhow::Result<()> {
    let tree = read_json(Cursor::new(defective.to_json()))?;
    let scanner = Scanner::new(standard_registry()?, ScanConfig::default())?;
    let (summary, report) = scanner.scan(&tree);
    assert!(summary.failed_rules.is_empty());

    let missing_genes = find(&report, "MISSING_GENES");
    assert_eq!(missing_genes.count(), 1);
    assert!(missing_genes.locators[0].contains("orphan protein"));
    assert!(missing_genes.fatal);

    let overlapping = find(&report, "OVERLAPPING_GENES");
    assert_eq!(overlapping.locators, vec![
        "gene\tDEMO_00000\tseq1:1-900",
        "gene\tDEMO_99999\tseq1:501-1500",
    ]);
    assert!(!overlapping.fatal);

    assert_eq!(find(&report, "EXTRA_GENES").count(), 1);
    assert_eq!(find(&report, "MISSING_LOCUS_TAGS").count(), 1);

    let quals = find(&report, "DISC_SOURCE_QUALS_ASNDISC");
    let country = quals
        .subcategory("country (all present, some duplicate)")
        .unwrap();
    assert!(country.fatal);
    assert_eq!(
        country
            .subcategory("country = USA")
            .unwrap()
            .count(),
        3
    );
    Ok(())
}

#[rstest]
fn test_parallel_scan_matches_sequential() -> anyhow::Result<()> {
    let submission = DemoSubmission::new(24, 12).with_defects(Defects {
        orphan_cds:        true,
        overlapping_genes: true,
        missing_locus_tag: true,
        mixed_country:     false,
    });
    let tree = read_json(Cursor::new(submission.to_json()))?;
    let config = ScanConfig::default().with_kind(ReportKind::Oncaller);

    let sequential = Scanner::new(standard_registry()?, config.clone())?;
    let parallel = Scanner::new(standard_registry()?, config.with_parallel(true))?;
    let (seq_summary, seq_report) = sequential.scan(&tree);
    let (par_summary, par_report) = parallel.scan(&tree);

    assert_eq!(seq_summary, par_summary);
    assert_eq!(seq_report, par_report);
    Ok(())
}

#[rstest]
fn test_oncaller_with_lookup(clean: DemoSubmission) -> anyhow::Result<()> {
    let tree = read_json(Cursor::new(clean.to_json()))?;
    let lookup = StaticLookup::from_reader(Cursor::new(
        r#"[{"taxname": "Escherichia coli", "taxid": 562, "lineage": "Bacteria; Pseudomonadota"}]"#,
    ))?;
    let config = ScanConfig::default().with_kind(ReportKind::Oncaller);
    let scanner = Scanner::new(standard_registry()?, config)?.with_lookup(lookup);
    let (_, report) = scanner.scan(&tree);

    assert!(find(&report, "TAX_LOOKUP_MISSING").is_clean());
    assert!(find(&report, "TAX_LOOKUP_MISMATCH").is_clean());
    assert!(find(&report, "ONCALLER_MULTISRC").is_clean());

    let features = find(&report, "DISC_FEATURE_COUNT");
    assert_eq!(
        features
            .subcategory("gene: [n] present")
            .unwrap()
            .description,
        "gene: 20 present"
    );
    Ok(())
}

#[rstest]
fn test_rendered_report(defective: DemoSubmission) -> anyhow::Result<()> {
    let tree = read_json(Cursor::new(defective.to_json()))?;
    let scanner = Scanner::new(standard_registry()?, ScanConfig::default())?;
    let (_, report) = scanner.scan(&tree);

    let text = TextRenderer::new().render_to_string(&report);
    assert!(text.starts_with("Discrepancy Report Results\n\nSummary\n"));
    assert!(text.contains("MISSING_GENES: FATAL: 1 feature has no genes.\n"));
    assert!(text.contains("DiscRep_ALL:OVERLAPPING_GENES: 2 genes overlap another gene on the same strand.\n"));
    assert!(!text.contains("SHORT_SEQUENCES"));

    let mut buf = Vec::new();
    write_json(&report, &mut buf)?;
    let parsed: Vec<ReportItem> = serde_json::from_slice(&buf)?;
    assert_eq!(parsed, report);
    Ok(())
}

#[test]
fn test_config_from_json() -> anyhow::Result<()> {
    let config = ScanConfig::from_reader(Cursor::new(
        r#"{"kind": "oncaller", "disable": ["N_RUNS"], "short_sequence_len": 200}"#,
    ))?;
    assert_eq!(config.kind, ReportKind::Oncaller);
    assert_eq!(config.short_sequence_len, 200);
    assert_eq!(config.n_run_len, 10);

    let scanner = Scanner::new(standard_registry()?, config)?;
    assert!(!scanner.enabled().contains("N_RUNS"));
    assert!(scanner.enabled().contains("TAX_LOOKUP_MISSING"));

    assert!(ScanConfig::from_reader(Cursor::new(r#"{"n_run_len": 0}"#)).is_err());
    assert!(ScanConfig::from_reader(Cursor::new(
        r#"{"enable": ["N_RUNS"], "disable": ["N_RUNS"]}"#
    ))
    .is_err());
    Ok(())
}

#[test]
fn test_unknown_rule_in_config() -> anyhow::Result<()> {
    let config = ScanConfig::default().with_disable(vec!["NOT_A_RULE".into()]);
    let err = Scanner::new(standard_registry()?, config).err().unwrap();
    assert!(matches!(err, DiscrepError::UnknownRule(_)));
    Ok(())
}
