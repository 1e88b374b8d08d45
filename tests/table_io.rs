//! Heuristic table persistence through the filesystem.

use std::fs;

use poker_squares::card::parse_line;
use poker_squares::{encode, HeuristicTable, LineEncoding, TableError};

fn key(text: &str, plays: usize) -> LineEncoding {
    encode(&parse_line(text).unwrap(), plays)
}

fn sample_table() -> HeuristicTable {
    [
        (key("2C 2D _ _ _", 2), 41.25),
        (key("_ _ _ _ _", 0), 60.5),
        (key("AS KS QS JS TS", 25), 30.0),
        (key("3H 3S 3D 9C 9D", 20), -1.5),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("table.json");
    let table = sample_table();
    table.save(&path).unwrap();

    let loaded = HeuristicTable::load(&path).unwrap();
    assert_eq!(loaded, table);
    assert!(!path.with_extension("json.tmp").exists(), "temp file renamed away");
}

#[test]
fn test_saved_keys_are_sorted_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    sample_table().save(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let first = text.find("\"0:").unwrap();
    let second = text.find("\"2:").unwrap();
    assert!(first < second, "keys in sorted order: {text}");
    assert!(text.contains("\"2:poh\":41.25"), "{text}");
}

#[test]
fn test_save_overwrites_previous_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    sample_table().save(&path).unwrap();

    let smaller: HeuristicTable = [(key("_ _ _ _ _", 1), 1.0)].into_iter().collect();
    smaller.save(&path).unwrap();
    assert_eq!(HeuristicTable::load(&path).unwrap(), smaller);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = HeuristicTable::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, TableError::Io { .. }), "got {err:?}");
}

#[test]
fn test_truncated_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    fs::write(&path, "{\"0:foh\": 60.5, \"1:").unwrap();
    let err = HeuristicTable::load(&path).unwrap_err();
    assert!(matches!(err, TableError::Parse { .. }), "got {err:?}");
}

#[test]
fn test_bad_key_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    fs::write(&path, r#"{"0:foh": 60.5, "pair of kings": 3.0}"#).unwrap();
    match HeuristicTable::load(&path).unwrap_err() {
        TableError::InvalidKey { key, .. } => assert_eq!(key, "pair of kings"),
        other => panic!("expected InvalidKey, got {other:?}"),
    }
}

#[test]
fn test_out_of_range_score_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    fs::write(&path, r#"{"0:foh": 1e999}"#).unwrap();
    let err = HeuristicTable::load(&path).unwrap_err();
    assert!(matches!(err, TableError::Parse { .. }), "got {err:?}");
}

#[test]
fn test_aliased_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.json");
    fs::write(&path, r#"{"7:f": 1.0, "07:f": 2.0}"#).unwrap();
    match HeuristicTable::load(&path).unwrap_err() {
        TableError::InvalidKey { key, .. } => assert_eq!(key, "07:f"),
        other => panic!("expected InvalidKey, got {other:?}"),
    }
}
