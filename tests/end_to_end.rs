//! Replays the end-to-end scenarios from the design doc against the
//! in-memory storage adapter, exercising the engine the way a host process
//! would: through `Engine::execute` with a flat argument vector.

use simindex::storage::memory::InMemoryStorage;
use simindex::{Engine, Output, RuntimeLimits, Score};

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}

fn engine() -> Engine<InMemoryStorage> {
    Engine::new(InMemoryStorage::new(), RuntimeLimits::default())
}

fn classified(output: Output) -> Vec<(String, Vec<Score>)> {
    match output {
        Output::Classified(results) => results,
        Output::Recorded => panic!("expected CLASSIFY output"),
    }
}

const HEADER: [&str; 5] = ["s", "2", "60", "1", "120"];

fn with_header<'a>(tail: &[&'a str]) -> Vec<String> {
    let mut tokens: Vec<&str> = HEADER.to_vec();
    tokens.extend_from_slice(tail);
    argv(&tokens)
}

/// E1: record and self-recall, score 1.0 with collisions=2.
#[test]
fn e1_record_and_self_recall() {
    let engine = engine();
    engine
        .execute(&with_header(&[
            "RECORD", "a", "m", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();

    let output = engine
        .execute(&with_header(&[
            "CLASSIFY", "m", "1", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();
    let results = classified(output);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "a");
    assert_eq!(results[0].1, vec![Score::Value(1.0)]);
}

/// E2: partial overlap scores 0.75 per the worked example.
#[test]
fn e2_partial_overlap() {
    let engine = engine();
    engine
        .execute(&with_header(&[
            "RECORD", "b", "m", "2", "10", "1", "11", "1", "1", "20", "1",
        ]))
        .unwrap();

    let output = engine
        .execute(&with_header(&[
            "CLASSIFY", "m", "1", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();
    let results = classified(output);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "b");
    match results[0].1[0] {
        Score::Value(v) => assert!((v - 0.75).abs() < 1e-9),
        Score::Sentinel => panic!("expected a numeric score"),
    }
}

/// E3: raising the threshold above what a single-band query can supply
/// empties the result set.
#[test]
fn e3_threshold_filter_excludes_everyone() {
    let engine = engine();
    engine
        .execute(&with_header(&[
            "RECORD", "a", "m", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();
    engine
        .execute(&with_header(&[
            "RECORD", "b", "m", "2", "10", "1", "11", "1", "1", "20", "1",
        ]))
        .unwrap();

    let output = engine
        .execute(&with_header(&["CLASSIFY", "m", "2", "1", "10", "1", "0"]))
        .unwrap();
    assert!(classified(output).is_empty());
}

/// E4 (adapted): under STRICT, a query whose own signature is empty can only
/// ever surface a candidate that another query in the same request already
/// recalled (an all-empty query never touches the Candidate Index on its
/// own). Once surfaced, an empty-vs-non-empty mismatch against the
/// stored signature for that query's own feature rejects the candidate
/// outright; a genuine both-empty pairing scores the wire sentinel instead.
#[test]
fn e4_strict_emptiness_mismatch_and_sentinel() {
    let engine = engine();
    // "a" has a non-empty signature under "m".
    engine
        .execute(&with_header(&[
            "RECORD", "a", "m", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();
    // "d" has a non-empty signature under "n" only (nothing under "m").
    engine
        .execute(&with_header(&[
            "RECORD", "d", "n", "1", "30", "1", "0",
        ]))
        .unwrap();

    // Query 0 recalls "a" via feature "m"; query 1 is an empty probe on the
    // same feature "m", which must mismatch against "a"'s non-empty record.
    let output = engine
        .execute(&with_header(&[
            "CLASSIFY",
            "STRICT",
            "m", "1", "1", "10", "1", "1", "20", "1",
            "m", "0", "0", "0",
        ]))
        .unwrap();
    assert!(classified(output).is_empty(), "a must be rejected on mismatch");

    // Query 0 recalls "d" via feature "n"; query 1 probes feature "m" empty,
    // and "d" has no stored signature under "m" either => both empty =>
    // sentinel, and "d" survives.
    let output = engine
        .execute(&with_header(&[
            "CLASSIFY",
            "STRICT",
            "n", "1", "1", "30", "1", "0",
            "m", "0", "0", "0",
        ]))
        .unwrap();
    let results = classified(output);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "d");
    assert_eq!(results[0].1[1], Score::Sentinel);
}

/// E5: lenient OR across two feature indices, one matching and one disjoint.
#[test]
fn e5_multi_feature_lenient_or() {
    let engine = engine();
    engine
        .execute(&with_header(&[
            "RECORD", "c", "m", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();
    engine
        .execute(&with_header(&[
            "RECORD", "c", "n", "1", "50", "1", "1", "60", "1",
        ]))
        .unwrap();

    let output = engine
        .execute(&with_header(&[
            "CLASSIFY",
            "m", "1", "1", "10", "1", "1", "20", "1",
            "n", "1", "1", "99", "1", "1", "98", "1",
        ]))
        .unwrap();
    let results = classified(output);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "c");
    assert_eq!(results[0].1[0], Score::Value(1.0));
    assert_eq!(results[0].1[1], Score::Value(0.0));
}

/// E6: a record outside the retention window at read time never comes back.
#[test]
fn e6_sliding_window_expiration() {
    let engine = Engine::new(InMemoryStorage::new(), RuntimeLimits::default());
    engine
        .execute(&argv(&[
            "s", "2", "60", "1", "0", "RECORD", "a", "m", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();

    let output = engine
        .execute(&argv(&[
            "s", "2", "60", "1", "180", "CLASSIFY", "m", "1", "1", "10", "1", "1", "20", "1",
        ]))
        .unwrap();
    assert!(classified(output).is_empty());
}

/// E7: a Configuration exceeding runtime limits is rejected before any
/// storage mutation occurs.
#[test]
fn e7_runtime_limit_rejection() {
    let engine = Engine::new(InMemoryStorage::new(), RuntimeLimits::default());
    let result = engine.execute(&argv(&[
        "s", "200", "60", "1", "120", "RECORD", "a", "m", "0",
    ]));
    assert!(result.is_err());
}

/// Additivity: two RECORDs for the same (feature, item) accumulate counts,
/// which should be visible as a higher collision strength at the same bucket.
#[test]
fn additivity_across_records() {
    let engine = engine();
    engine
        .execute(&with_header(&["RECORD", "a", "m", "1", "10", "1", "0"]))
        .unwrap();
    engine
        .execute(&with_header(&["RECORD", "a", "m", "1", "10", "4", "0"]))
        .unwrap();

    let output = engine
        .execute(&with_header(&["CLASSIFY", "m", "1", "1", "10", "1", "0"]))
        .unwrap();
    let results = classified(output);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "a");
    // band 1 is now {10: 5} on both sides => perfect match in band 1;
    // band 2 is empty on both sides => treated as maximal distance (0.0).
    assert_eq!(results[0].1[0], Score::Value(0.5));
}
