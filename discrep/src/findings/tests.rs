use arcstr::ArcStr;
use indexmap::IndexSet;
use rstest::rstest;

use super::codec::*;
use super::*;
use crate::error::DiscrepError;

#[rstest]
#[case::ungrouped("seq1", 0)]
#[case::one_key("A$loc1", 1)]
#[case::two_keys("A$B#gene\tabc\tchr1:1-10", 2)]
#[case::four_keys("a$b#c@d&loc", 4)]
fn test_decode_then_encode_reproduces_input(
    #[case] raw: &str,
    #[case] arity: usize,
) {
    let finding = decode(raw, arity).unwrap();
    assert_eq!(finding.depth(), arity);
    assert_eq!(encode(&finding).unwrap(), raw);
}

#[test]
fn test_decode_fields() {
    let finding = decode("country (some missing)$USA#rec1: source", 2).unwrap();
    assert_eq!(finding.class_keys, vec!["country (some missing)", "USA"]);
    assert_eq!(finding.locator, "rec1: source");
}

#[test]
fn test_locator_may_hold_delimiters() {
    let finding = decode("A$loc$with#marks", 1).unwrap();
    assert_eq!(finding.locator, "loc$with#marks");
}

#[test]
fn test_decode_arity_mismatch() {
    assert_eq!(decode("no-delimiter", 1), Err(CodecError::Arity {
        expected: 1,
        found:    0,
    }));
    assert_eq!(decode("A$only-one", 2), Err(CodecError::Arity {
        expected: 2,
        found:    1,
    }));
    assert!(matches!(decode("a$b#c@d&e", 5), Err(CodecError::TooDeep(5))));
    assert_eq!(
        CodecError::TooDeep(5).to_string(),
        "at most 4 nesting levels are supported, got 5"
    );
}

#[test]
fn test_decode_rejects_inner_delimiter_in_key() {
    let err = decode("A#B$loc", 1).unwrap_err();
    assert_eq!(err, CodecError::ReservedDelimiter {
        key:       "A#B".to_string(),
        delimiter: '#',
    });
}

#[test]
fn test_encode_rejects_reserved_delimiters() {
    let finding = Finding::keyed(["price $5"], "loc");
    assert!(matches!(
        encode(&finding),
        Err(CodecError::ReservedDelimiter { delimiter: '$', .. })
    ));
    assert_eq!(encode(&Finding::new("")), Err(CodecError::EmptyLocator));
    assert_eq!(decode("A$", 1), Err(CodecError::EmptyLocator));
}

#[test]
fn test_finding_builders() {
    let finding = Finding::new("loc").with_key("outer").with_key("inner");
    assert_eq!(finding, Finding::keyed(["outer", "inner"], "loc"));
}

// --- Store ---

#[test]
fn test_store_keeps_insertion_order_per_rule() {
    let mut store = FindingStore::new();
    store.append("R1", Finding::new("a"));
    store.append("R2", Finding::new("x"));
    store.append("R1", Finding::new("b"));
    store.append_packed("R1", "K$c", 1);

    let decoded: Vec<Finding> = store
        .entries("R1")
        .iter()
        .map(|f| f.decode().unwrap())
        .collect();
    assert_eq!(decoded, vec![
        Finding::new("a"),
        Finding::new("b"),
        Finding::keyed(["K"], "c"),
    ]);
    assert_eq!(store.len(), 4);
    assert_eq!(
        store.rules().map(ArcStr::as_str).collect::<Vec<_>>(),
        vec!["R1", "R2"]
    );
    assert!(store.entries("R3").is_empty());
}

#[test]
fn test_store_clear_and_merge() {
    let mut first = FindingStore::new();
    first.append("R1", Finding::new("a"));
    let mut second = FindingStore::new();
    second.append("R1", Finding::new("b"));
    second.record_failure("R2", DiscrepError::rule_execution("R2", "boom"));

    first.merge(second);
    assert_eq!(first.entries("R1").len(), 2);
    assert_eq!(first.entries("R1")[1], StoredFinding::Typed(Finding::new("b")));
    assert_eq!(first.failures("R2").len(), 1);

    first.clear();
    assert!(first.is_empty());
}

#[test]
fn test_sink_drops_disabled_rules() {
    let mut store = FindingStore::new();
    let enabled: IndexSet<ArcStr> = [ArcStr::from("ON")].into_iter().collect();
    {
        let mut sink = FindingSink::new(&mut store, &enabled);
        sink.emit("ON", Finding::new("a"));
        sink.emit("OFF", Finding::new("b"));
        sink.emit_packed("ON", "K$c", 1);
        sink.emit_packed("OFF", "K$d", 1);
        assert_eq!(sink.emitted(), 2);
        assert!(!sink.is_enabled("OFF"));
    }
    assert_eq!(store.entries("ON").len(), 2);
    assert!(store.entries("OFF").is_empty());
}

#[rstest]
#[case::own_level("AB$C")]
#[case::inner_level("AB#C")]
fn test_sink_encoded_rejects_reserved_key(#[case] key: &str) {
    let mut store = FindingStore::new();
    let enabled: IndexSet<ArcStr> = [ArcStr::from("ON")].into_iter().collect();
    {
        let mut sink = FindingSink::new(&mut store, &enabled);
        sink.emit_encoded("ON", &Finding::keyed(["ABC"], "gene\tABC_1"));
        sink.emit_encoded("ON", &Finding::keyed([key], "gene\tAB$C_2"));
        assert_eq!(sink.emitted(), 1);
    }

    assert_eq!(store.entries("ON"), &[StoredFinding::Packed {
        raw:   "ABC$gene\tABC_1".to_owned(),
        arity: 1,
    }]);
    assert_eq!(store.failures("ON").len(), 1);
    assert!(matches!(
        store.failures("ON")[0],
        DiscrepError::EncodingViolation { .. }
    ));
}
