use rstest::rstest;

use super::*;
use crate::data_structs::enums::Strand;

fn iv(
    start: u32,
    end: u32,
    strand: Strand,
) -> Interval {
    Interval::new("chr1", start, end, strand)
}

// --- Interval Tests ---

#[test]
fn test_interval_basic_accessors() {
    let interval = iv(100, 200, Strand::Forward);
    assert_eq!(interval.seqid().as_str(), "chr1");
    assert_eq!(interval.start(), 100);
    assert_eq!(interval.end(), 200);
    assert_eq!(interval.length(), 100);
    assert!(!interval.is_empty());
}

#[test]
#[should_panic]
fn test_interval_new_rejects_inverted() {
    iv(200, 100, Strand::Forward);
}

#[test]
fn test_interval_try_new_rejects_inverted() {
    assert!(Interval::try_new("chr1", 200, 100, Strand::None).is_err());
    assert!(Interval::try_new("chr1", 100, 100, Strand::None).is_ok());
}

#[rstest]
#[case::forward(Strand::Forward, 100, 200)]
#[case::reverse(Strand::Reverse, 200, 100)]
#[case::unstranded(Strand::None, 100, 200)]
fn test_interval_biological_ends(
    #[case] strand: Strand,
    #[case] five: u32,
    #[case] three: u32,
) {
    let interval = iv(100, 200, strand);
    assert_eq!(interval.five_prime(), five);
    assert_eq!(interval.three_prime(), three);
}

#[test]
fn test_interval_overlaps_and_is_in() {
    let a = iv(100, 200, Strand::Forward);
    let b = iv(199, 300, Strand::Forward);
    let c = iv(200, 300, Strand::Forward);
    let other_seq = Interval::new("chr2", 100, 200, Strand::Forward);

    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&c));
    assert!(!a.overlaps(&other_seq));
    assert!(iv(120, 150, Strand::None).is_in(&a));
    assert!(!b.is_in(&a));
}

#[test]
fn test_interval_display() {
    assert_eq!(iv(100, 200, Strand::Forward).to_string(), "chr1:101-200");
    assert_eq!(iv(100, 200, Strand::Reverse).to_string(), "chr1:c200-101");
}

// --- Location Tests ---

#[test]
fn test_location_rejects_overlapping_intervals() {
    let res = Location::new(vec![
        iv(100, 200, Strand::Forward),
        iv(150, 250, Strand::Forward),
    ]);
    assert!(res.is_err());
}

#[test]
fn test_location_rejects_wrong_order() {
    let plus_reversed = Location::new(vec![
        iv(300, 400, Strand::Forward),
        iv(100, 200, Strand::Forward),
    ]);
    assert!(plus_reversed.is_err());

    let minus_ascending = Location::new(vec![
        iv(100, 200, Strand::Reverse),
        iv(300, 400, Strand::Reverse),
    ]);
    assert!(minus_ascending.is_err());

    let minus_descending = Location::new(vec![
        iv(300, 400, Strand::Reverse),
        iv(100, 200, Strand::Reverse),
    ]);
    assert!(minus_descending.is_ok());
}

#[test]
fn test_location_ends_follow_strand() {
    let minus = Location::new(vec![
        iv(300, 400, Strand::Reverse),
        iv(100, 200, Strand::Reverse),
    ])
    .unwrap();
    assert_eq!(minus.five_prime(), Some(400));
    assert_eq!(minus.three_prime(), Some(100));
    assert_eq!(minus.strand(), Strand::Reverse);
    assert_eq!(minus.total_length(), 200);

    let span = minus.span().unwrap();
    assert_eq!((span.start(), span.end()), (100, 400));
}

#[test]
fn test_location_mixed_strand_is_none() {
    let loc = Location::new(vec![
        iv(100, 200, Strand::Forward),
        iv(300, 400, Strand::Reverse),
    ])
    .unwrap();
    assert_eq!(loc.strand(), Strand::None);
}

#[test]
fn test_location_empty() {
    assert!(Location::empty().is_empty());
    assert!(Location::from(iv(10, 10, Strand::Forward)).is_empty());
    assert!(Location::empty().five_prime().is_none());
    assert_eq!(Location::empty().to_string(), "<empty>");
}

#[test]
fn test_location_merged_drops_strand_and_sorts() {
    let loc = Location::new(vec![
        iv(300, 400, Strand::Reverse),
        iv(100, 300, Strand::Reverse),
    ])
    .unwrap();
    let merged = loc.merged();
    assert_eq!(merged, vec![iv(100, 400, Strand::None)]);
}

#[test]
fn test_location_gaps() {
    let loc = Location::new(vec![
        iv(100, 200, Strand::Forward),
        iv(205, 300, Strand::Forward),
        iv(400, 500, Strand::Forward),
    ])
    .unwrap();
    assert_eq!(loc.gaps().collect::<Vec<_>>(), vec![5, 100]);
}

#[test]
fn test_location_display_partial() {
    let loc = Location::new(vec![
        iv(100, 200, Strand::Forward),
        iv(300, 400, Strand::Forward),
    ])
    .unwrap()
    .with_partial_start(true)
    .with_partial_stop(true);
    assert_eq!(loc.to_string(), "chr1:<101-200,301->400");
}

#[test]
fn test_location_deserialize_validates() {
    let good = r#"{"intervals":[{"seqid":"chr1","start":1,"end":5,"strand":"-"}],"partial_stop":true}"#;
    let loc: Location = serde_json::from_str(good).unwrap();
    assert!(loc.partial_stop());
    assert_eq!(loc.strand(), Strand::Reverse);

    let bad = r#"{"intervals":[{"seqid":"chr1","start":9,"end":5}]}"#;
    assert!(serde_json::from_str::<Location>(bad).is_err());
}
