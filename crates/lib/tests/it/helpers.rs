//! Shared test fixtures.

use arbor::Store;
use serde_json::json;

/// Builds a store exercising every node kind: scalar config, a sequence of
/// structured elements, and a module subtree.
pub fn sample_store() -> Store {
    let mut store = Store::new();
    store
        .insert(
            "config/server",
            json!({"host": "localhost", "port": 8080, "tls": false}),
        )
        .unwrap();
    store.push("log", json!("started")).unwrap();
    store.push("log", json!("listening")).unwrap();
    store.create_module("modules/planner").unwrap();
    store
        .set("modules/planner/prompt", json!("plan the next step\nthen act\n"))
        .unwrap();
    store
}
