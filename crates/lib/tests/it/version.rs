//! Tests for checkpointing and restore.

use arbor::Store;
use serde_json::json;

use crate::helpers::sample_store;

#[test]
fn deleted_subtree_survives_in_earlier_checkpoint() {
    let mut store = Store::new();
    store.set("a/b", json!(1)).unwrap();
    store.push("list", json!("x")).unwrap();
    store.push("list", json!("y")).unwrap();
    let before_delete = store.set_checkpoint();
    store.delete("list").unwrap();
    let after_delete = store.set_checkpoint();

    let restored = store.restore(before_delete).unwrap();
    assert_eq!(restored.materialize("list").unwrap(), json!(["x", "y"]));
    assert_eq!(restored.get("a/b").unwrap(), json!(1));

    let restored = store.restore(after_delete).unwrap();
    assert!(restored.get_node("list").unwrap_err().is_not_found());
    assert_eq!(restored.get("a/b").unwrap(), json!(1));
}

#[test]
fn timeline_of_checkpoints() {
    let mut store = Store::new();
    let mut checkpoints = Vec::new();
    for step in 1..=5 {
        store.set("counter", json!(step)).unwrap();
        store.push("history", json!(format!("step {step}"))).unwrap();
        checkpoints.push(store.set_checkpoint());
    }
    assert_eq!(store.checkpoint_count(), 5);

    for (i, &checkpoint) in checkpoints.iter().enumerate() {
        let restored = store.restore(checkpoint).unwrap();
        assert_eq!(restored.get("counter").unwrap(), json!(i + 1));
        assert_eq!(
            restored.get_sequence("history").unwrap().children.len(),
            i + 1
        );
    }
}

#[test]
fn restore_is_independent_of_the_live_store() {
    let mut store = sample_store();
    let checkpoint = store.set_checkpoint();
    store.set("config/server/port", json!(1)).unwrap();

    let mut restored = store.restore(checkpoint).unwrap();
    restored.set("config/server/port", json!(2)).unwrap();

    // Three stores, three values.
    assert_eq!(store.get("config/server/port").unwrap(), json!(1));
    assert_eq!(restored.get("config/server/port").unwrap(), json!(2));
    assert_eq!(
        store
            .restore(checkpoint)
            .unwrap()
            .get("config/server/port")
            .unwrap(),
        json!(8080)
    );
}

#[test]
fn structural_rewrites_replay_correctly() {
    let mut store = Store::new();
    store.insert("data", json!({"kind": "object", "items": [1, 2, 3]})).unwrap();
    store.set_checkpoint();
    // Replace a mapping with a sequence and shrink a sequence in one epoch.
    store.delete("data/kind").unwrap();
    store.delete("data/items/2").unwrap();
    store.set("data/mode", json!("trimmed")).unwrap();
    let checkpoint = store.set_checkpoint();

    let restored = store.restore(checkpoint).unwrap();
    assert_eq!(
        restored.materialize("data").unwrap(),
        json!({"items": [1, 3], "mode": "trimmed"})
    );
}

#[test]
fn module_boundaries_replay() {
    let mut store = sample_store();
    let checkpoint = store.set_checkpoint();
    let restored = store.restore(checkpoint).unwrap();
    assert_eq!(
        restored.find_module("modules/planner/prompt").unwrap().to_string(),
        "modules/planner"
    );
}

#[test]
fn invalid_checkpoint_is_rejected_with_context() {
    let store = sample_store();
    let err = store.restore(3).unwrap_err();
    assert!(err.is_invalid_checkpoint());
    assert_eq!(err.module(), "version");
    assert!(err.to_string().contains("invalid checkpoint 3"));
}
