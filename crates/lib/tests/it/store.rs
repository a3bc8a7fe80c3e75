//! End-to-end tests for path-addressed reads and writes.

use arbor::{Store, TreePath};
use serde_json::json;

use crate::helpers::sample_store;

#[test]
fn mixed_workflow() {
    let mut store = sample_store();

    assert_eq!(store.get("config/server/host").unwrap(), json!("localhost"));
    assert_eq!(store.get("log/2").unwrap(), json!("listening"));
    assert_eq!(
        store.get("modules/planner/prompt").unwrap(),
        json!("plan the next step\nthen act\n")
    );

    store.set("config/server/port", json!(9090)).unwrap();
    store.delete("config/server/tls").unwrap();
    let third = store.push("log", json!("stopped")).unwrap();
    assert_eq!(third.to_string(), "log/3");

    assert_eq!(
        store.materialize("config/server").unwrap(),
        json!({"host": "localhost", "port": 9090})
    );
}

#[test]
fn error_taxonomy_is_stable_across_operations() {
    let mut store = sample_store();

    // Absence.
    assert!(store.get("config/missing").unwrap_err().is_not_found());
    assert!(store.delete("config/missing").unwrap_err().is_not_found());
    assert!(store.get_node("log/3").unwrap_err().is_not_found());

    // Kind conflicts.
    assert!(store.get_node("config/1").unwrap_err().is_type_mismatch());
    assert!(store.get_node("log/name").unwrap_err().is_type_mismatch());
    assert!(store
        .get_node("config/server/host/below")
        .unwrap_err()
        .is_type_mismatch());
    assert!(store.push("config", json!(1)).unwrap_err().is_type_mismatch());

    // Malformed segments.
    assert!(store.get_node("log/0").unwrap_err().is_segment_error());
    assert!(store.get_node("log/999").unwrap_err().is_segment_error());
    assert!(store.set("a//b", json!(1)).unwrap_err().is_segment_error());
    assert!(store
        .set(TreePath::from(["config", "bad#name"]), json!(1))
        .unwrap_err()
        .is_segment_error());
}

#[test]
fn error_messages_name_the_offending_position() {
    let store = sample_store();
    let err = store.get_node("config/1").unwrap_err();
    assert_eq!(err.module(), "store");
    let message = err.to_string();
    assert!(message.contains(">>>1<<<"), "got: {message}");
    assert!(message.contains("sequence"), "got: {message}");
}

#[test]
fn failed_writes_do_not_create_partial_ancestors() {
    let mut store = Store::new();
    // The tail segment is malformed, so nothing may be created.
    assert!(store.set("fresh/branch/0", json!(1)).unwrap_err().is_segment_error());
    assert!(!store.node_exists("fresh"));
}

#[test]
fn sequence_addresses_shift_after_delete() {
    let mut store = Store::new();
    for value in ["a", "b", "c", "d"] {
        store.push("items", json!(value)).unwrap();
    }
    store.delete("items/1").unwrap();
    assert_eq!(
        store.materialize("items").unwrap(),
        json!(["b", "c", "d"])
    );
    // The freed tail position can be appended to again.
    store.set("items/4", json!("e")).unwrap();
    assert_eq!(store.get("items/4").unwrap(), json!("e"));
}

#[test]
fn insert_merges_without_clearing_siblings() {
    let mut store = sample_store();
    store
        .insert("config/server", json!({"workers": 4}))
        .unwrap();
    assert_eq!(store.get("config/server/workers").unwrap(), json!(4));
    assert_eq!(store.get("config/server/host").unwrap(), json!("localhost"));
}

#[test]
fn find_module_resolves_nearest_boundary() {
    let mut store = sample_store();
    store
        .set("modules/planner/state/step", json!(1))
        .unwrap();
    assert_eq!(
        store
            .find_module("modules/planner/state/step")
            .unwrap()
            .to_string(),
        "modules/planner"
    );
    assert!(store.find_module("config/server/host").unwrap().is_empty());
    // Missing prefixes surface as traversal errors, not as the root module.
    assert!(store.find_module("modules/unknown/x").unwrap_err().is_not_found());
}

#[test]
fn paths_parse_from_multiple_forms() {
    let mut store = Store::new();
    store.set(TreePath::from(["a", "b"]), json!(1)).unwrap();
    assert_eq!(store.get("a/b").unwrap(), json!(1));
    assert_eq!(store.get(TreePath::parse("a/b")).unwrap(), json!(1));
    assert_eq!(store.get("a/b".parse::<TreePath>().unwrap()).unwrap(), json!(1));
}
