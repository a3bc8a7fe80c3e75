//! Tests for the snapshot and structured-text codecs.

use arbor::Store;
use serde_json::json;

use crate::helpers::sample_store;

#[test]
fn snapshot_round_trip_preserves_structure() {
    let store = sample_store();
    let decoded = Store::from_snapshot(&store.to_snapshot().unwrap()).unwrap();
    assert_eq!(decoded.root(), store.root());
    assert!(decoded.get_mapping("modules/planner").unwrap().is_module);
}

#[test]
fn snapshot_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("state.json");

    let store = sample_store();
    store.save_to_file(&file).unwrap();
    let loaded = Store::load_from_file(&file).unwrap();
    assert_eq!(loaded.root(), store.root());
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Store::load_from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(err.is_io_error());
    assert_eq!(err.module(), "io");
}

#[test]
fn text_round_trip_preserves_structure() {
    let store = sample_store();
    let text = store.to_text().unwrap();
    let parsed = Store::from_text(&text).unwrap();
    assert_eq!(parsed.root(), store.root());
}

#[test]
fn text_form_is_readable() {
    let store = sample_store();
    let text = store.to_text().unwrap();
    assert!(text.contains("$module: true"), "got: {text}");
    assert!(text.contains("host: localhost"), "got: {text}");
    // The multi-line prompt renders as a block scalar.
    assert!(text.contains('|'), "got: {text}");
    // No JSON noise in the human form.
    assert!(!text.contains("\"kind\""), "got: {text}");
}

#[test]
fn codecs_agree_on_the_same_tree() {
    let store = sample_store();
    let via_text = Store::from_text(&store.to_text().unwrap()).unwrap();
    let via_snapshot = Store::from_snapshot(&store.to_snapshot().unwrap()).unwrap();
    assert_eq!(via_text.root(), via_snapshot.root());
}

#[test]
fn decoded_stores_accept_further_edits() {
    let store = sample_store();
    let mut decoded = Store::from_text(&store.to_text().unwrap()).unwrap();
    decoded.set("config/server/port", json!(9999)).unwrap();
    decoded.push("log", json!("resumed")).unwrap();
    assert_eq!(decoded.get("log/3").unwrap(), json!("resumed"));

    let checkpoint = decoded.set_checkpoint();
    let restored = decoded.restore(checkpoint).unwrap();
    assert_eq!(restored.get("config/server/port").unwrap(), json!(9999));
}

#[test]
fn hand_written_text_loads() {
    let text = "\
$module: true
agents/planner:
  $module: true
  model: opus
  steps:
    - think
    - act
limits/tokens: 4096
";
    let store = Store::from_text(text).unwrap();
    assert!(store.get_mapping("agents/planner").unwrap().is_module);
    assert_eq!(store.get("agents/planner/steps/2").unwrap(), json!("act"));
    assert_eq!(store.get("limits/tokens").unwrap(), json!(4096));
    assert_eq!(
        store.find_module("agents/planner/model").unwrap().to_string(),
        "agents/planner"
    );
}
