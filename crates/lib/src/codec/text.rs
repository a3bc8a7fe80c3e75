//! The structured-text codec.
//!
//! Renders a store as YAML meant for human and model consumption:
//!
//! * Chains of single-child mappings collapse into one `a/b/c:` key, except
//!   through module boundaries and never when the single child is a leaf.
//! * Module boundaries carry a `$module: true` marker entry.
//! * Multi-line strings render as block literals.
//!
//! Parsing accepts both the collapsed and the fully nested spelling: every
//! mapping key is split on `/` into path segments, so `a/b/c: 1` and the
//! three-level nesting decode to the same tree.

use serde_json::Value;
use serde_yaml::{Mapping as YamlMapping, Value as Yaml};
use tracing::trace;

use crate::codec::CodecError;
use crate::node::{MappingNode, Node};
use crate::path::TreePath;
use crate::store::Store;
use crate::Result;

/// Key marking a mapping as a module boundary in structured text.
pub const MODULE_MARKER: &str = "$module";

impl Store {
    /// Renders the whole tree as structured text. An empty store renders as
    /// the empty string. The root's own module marker is omitted; the root
    /// is always a module.
    pub fn to_text(&self) -> Result<String> {
        match self.root() {
            Node::Mapping(mapping) if mapping.children.is_empty() => Ok(String::new()),
            Node::Mapping(mapping) => {
                let doc = collapsed_mapping(mapping, false);
                serde_yaml::to_string(&doc).map_err(|err| CodecError::Yaml(err).into())
            }
            other => Err(CodecError::InvalidText {
                reason: format!("root must be a mapping, got {}", other.kind()),
            }
            .into()),
        }
    }

    /// Renders the subtree at a path as structured text, without key
    /// collapsing. A module's marker is included so the rendering is
    /// self-describing.
    pub fn serialize_path(&self, path: impl Into<TreePath>) -> Result<String> {
        let node = self.get_node(path)?;
        let doc = plain_node(node);
        serde_yaml::to_string(&doc).map_err(|err| CodecError::Yaml(err).into())
    }

    /// Parses structured text into a new store. Blank input yields an empty
    /// store. Like [`from_snapshot`](Store::from_snapshot), the result has
    /// no checkpoints.
    pub fn from_text(text: &str) -> Result<Store> {
        let mut store = Store::new();
        if text.trim().is_empty() {
            return Ok(store);
        }
        let doc: Yaml = serde_yaml::from_str(text).map_err(CodecError::Yaml)?;
        let Yaml::Mapping(mapping) = doc else {
            return Err(CodecError::InvalidText {
                reason: "document root must be a mapping".to_string(),
            }
            .into());
        };
        insert_yaml_mapping(&mut store, &TreePath::new(), &mapping)?;
        Ok(store)
    }
}

// --- encoding ------------------------------------------------------------

/// Mapping rendering with single-child chain collapsing, used for the full
/// document form.
fn collapsed_mapping(mapping: &MappingNode, include_marker: bool) -> Yaml {
    let mut out = YamlMapping::new();
    if include_marker && mapping.is_module {
        out.insert(Yaml::String(MODULE_MARKER.to_string()), Yaml::Bool(true));
    }
    for (key, child) in &mapping.children {
        let (key, value) = collapsed_entry(key, child);
        out.insert(Yaml::String(key), value);
    }
    Yaml::Mapping(out)
}

/// Flattens a chain of single-child mappings into one slash-joined key.
/// The chain stops at modules, at mappings with more than one child, and
/// when the single child is a leaf.
fn collapsed_entry(key: &str, node: &Node) -> (String, Yaml) {
    let mut key = key.to_string();
    let mut node = node;
    while let Node::Mapping(mapping) = node {
        if mapping.is_module || mapping.children.len() != 1 {
            break;
        }
        let Some((child_key, child)) = mapping.children.iter().next() else {
            break;
        };
        if matches!(child, Node::Leaf(_)) {
            break;
        }
        key.push('/');
        key.push_str(child_key);
        node = child;
    }
    let value = match node {
        Node::Mapping(mapping) => collapsed_mapping(mapping, true),
        Node::Sequence(sequence) => {
            Yaml::Sequence(sequence.children.iter().map(plain_node).collect())
        }
        Node::Leaf(leaf) => json_to_yaml(&leaf.value),
    };
    (key, value)
}

/// Structure-preserving rendering without key collapsing, used for subtree
/// serialization and for sequence elements.
fn plain_node(node: &Node) -> Yaml {
    match node {
        Node::Leaf(leaf) => json_to_yaml(&leaf.value),
        Node::Sequence(sequence) => {
            Yaml::Sequence(sequence.children.iter().map(plain_node).collect())
        }
        Node::Mapping(mapping) => {
            let mut out = YamlMapping::new();
            if mapping.is_module {
                out.insert(Yaml::String(MODULE_MARKER.to_string()), Yaml::Bool(true));
            }
            for (key, child) in &mapping.children {
                out.insert(Yaml::String(key.clone()), plain_node(child));
            }
            Yaml::Mapping(out)
        }
    }
}

fn json_to_yaml(value: &Value) -> Yaml {
    match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Yaml::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Yaml::Number(u.into())
            } else {
                Yaml::Number(n.as_f64().unwrap_or(f64::NAN).into())
            }
        }
        Value::String(s) => Yaml::String(s.clone()),
        Value::Array(items) => Yaml::Sequence(items.iter().map(json_to_yaml).collect()),
        Value::Object(entries) => Yaml::Mapping(
            entries
                .iter()
                .map(|(key, value)| (Yaml::String(key.clone()), json_to_yaml(value)))
                .collect(),
        ),
    }
}

// --- decoding ------------------------------------------------------------

fn insert_yaml_mapping(store: &mut Store, path: &TreePath, mapping: &YamlMapping) -> Result<()> {
    for (key, value) in mapping {
        let key = scalar_key(key)?;
        if key == MODULE_MARKER {
            if matches!(value, Yaml::Bool(true)) {
                store.create_module(path)?;
            }
            continue;
        }
        // Keys may carry collapsed slash-joined chains.
        let mut target = path.clone();
        for segment in key.split('/') {
            target.push(segment);
        }
        insert_yaml_value(store, &target, value)?;
    }
    Ok(())
}

fn insert_yaml_value(store: &mut Store, path: &TreePath, value: &Yaml) -> Result<()> {
    match value {
        Yaml::Mapping(mapping) => {
            store.create_mapping(path)?;
            insert_yaml_mapping(store, path, mapping)
        }
        Yaml::Sequence(items) => {
            store.create_sequence(path)?;
            for (i, item) in items.iter().enumerate() {
                insert_yaml_value(store, &path.join((i + 1).to_string()), item)?;
            }
            Ok(())
        }
        scalar => {
            trace!(%path, "parsed scalar");
            store.set(path, yaml_scalar_to_json(scalar)?)
        }
    }
}

fn scalar_key(key: &Yaml) -> Result<String> {
    match key {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        other => Err(CodecError::InvalidText {
            reason: format!("mapping keys must be scalars, got {other:?}"),
        }
        .into()),
    }
}

fn yaml_scalar_to_json(value: &Yaml) -> Result<Value> {
    match value {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        CodecError::InvalidText {
                            reason: format!("non-finite number {n}"),
                        }
                        .into()
                    })
            }
        }
        other => Err(CodecError::InvalidText {
            reason: format!("unsupported value {other:?}"),
        }
        .into()),
    }
}
