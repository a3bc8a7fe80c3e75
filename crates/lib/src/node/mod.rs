//! The node model: a closed variant of mapping, sequence, and leaf nodes.
//!
//! Every node is owned exclusively by its parent (or by the store, for the
//! root), so the graph is a tree by construction. The serde representation of
//! [`Node`] is the snapshot wire schema: an internally tagged object with a
//! `kind` field of `"mapping"`, `"sequence"`, or `"leaf"`.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the store root node.
pub const ROOT_NAME: &str = "root";

/// The kind tag of a node, used in error reporting and kind checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Leaf,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Mapping => write!(f, "mapping"),
            NodeKind::Sequence => write!(f, "sequence"),
            NodeKind::Leaf => write!(f, "leaf"),
        }
    }
}

/// Informational tag describing a leaf value's primitive kind, or the element
/// type of a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    #[default]
    Any,
}

impl ValueType {
    /// Infers the tag from a value's primitive kind. Everything that is not a
    /// string, number, or boolean (null, objects, arrays) is `Any`.
    pub fn of(value: &Value) -> ValueType {
        match value {
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Bool(_) => ValueType::Boolean,
            _ => ValueType::Any,
        }
    }
}

/// A node with uniquely-named children. Insertion order is irrelevant;
/// children are kept sorted so diffs and serialized output are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingNode {
    pub name: String,
    pub is_module: bool,
    pub children: BTreeMap<String, Node>,
}

impl MappingNode {
    pub fn new(name: impl Into<String>) -> Self {
        MappingNode {
            name: name.into(),
            is_module: false,
            children: BTreeMap::new(),
        }
    }
}

/// A node with ordered children. The order is the data; positions are
/// addressed 1-based in path text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceNode {
    pub name: String,
    pub value_type: ValueType,
    pub children: Vec<Node>,
}

impl SequenceNode {
    pub fn new(name: impl Into<String>) -> Self {
        SequenceNode {
            name: name.into(),
            value_type: ValueType::Any,
            children: Vec::new(),
        }
    }
}

/// A terminal node holding an opaque value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafNode {
    pub name: String,
    pub value_type: ValueType,
    pub value: Value,
}

impl LeafNode {
    /// Wraps a value, inferring its type tag.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        LeafNode {
            name: name.into(),
            value_type: ValueType::of(&value),
            value,
        }
    }
}

/// A node in the store: a closed tagged variant with exhaustive matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Mapping(MappingNode),
    Sequence(SequenceNode),
    Leaf(LeafNode),
}

impl Node {
    /// Creates an empty mapping node.
    pub fn mapping(name: impl Into<String>) -> Node {
        Node::Mapping(MappingNode::new(name))
    }

    /// Creates an empty sequence node.
    pub fn sequence(name: impl Into<String>) -> Node {
        Node::Sequence(SequenceNode::new(name))
    }

    /// Creates a leaf node around a value.
    pub fn leaf(name: impl Into<String>, value: Value) -> Node {
        Node::Leaf(LeafNode::new(name, value))
    }

    /// Creates the root node: a mapping flagged as a module boundary.
    pub fn root() -> Node {
        let mut root = MappingNode::new(ROOT_NAME);
        root.is_module = true;
        Node::Mapping(root)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Mapping(_) => NodeKind::Mapping,
            Node::Sequence(_) => NodeKind::Sequence,
            Node::Leaf(_) => NodeKind::Leaf,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Mapping(node) => &node.name,
            Node::Sequence(node) => &node.name,
            Node::Leaf(node) => &node.name,
        }
    }

    pub fn as_mapping(&self) -> Option<&MappingNode> {
        match self {
            Node::Mapping(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut MappingNode> {
        match self {
            Node::Mapping(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceNode> {
        match self {
            Node::Sequence(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut SequenceNode> {
        match self {
            Node::Sequence(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(node) => Some(node),
            _ => None,
        }
    }

    /// Fully dereferences this subtree into plain values: mappings become
    /// objects, sequences become arrays, leaves yield their value.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Leaf(leaf) => leaf.value.clone(),
            Node::Mapping(mapping) => Value::Object(
                mapping
                    .children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.to_value()))
                    .collect(),
            ),
            Node::Sequence(sequence) => Value::Array(
                sequence.children.iter().map(Node::to_value).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_inference() {
        assert_eq!(ValueType::of(&json!("text")), ValueType::String);
        assert_eq!(ValueType::of(&json!(5000)), ValueType::Number);
        assert_eq!(ValueType::of(&json!(2.5)), ValueType::Number);
        assert_eq!(ValueType::of(&json!(true)), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!(null)), ValueType::Any);
        assert_eq!(ValueType::of(&json!({"k": 1})), ValueType::Any);
        assert_eq!(ValueType::of(&json!([1, 2])), ValueType::Any);
    }

    #[test]
    fn test_root_node() {
        let root = Node::root();
        let mapping = root.as_mapping().unwrap();
        assert_eq!(mapping.name, ROOT_NAME);
        assert!(mapping.is_module);
        assert!(mapping.children.is_empty());
    }

    #[test]
    fn test_to_value_nests() {
        let mut inner = MappingNode::new("server");
        inner
            .children
            .insert("host".into(), Node::leaf("host", json!("localhost")));
        let mut seq = SequenceNode::new("ports");
        seq.children.push(Node::leaf("1", json!(8080)));
        seq.children.push(Node::leaf("2", json!(8081)));
        let mut outer = MappingNode::new(ROOT_NAME);
        outer.children.insert("server".into(), Node::Mapping(inner));
        outer.children.insert("ports".into(), Node::Sequence(seq));

        assert_eq!(
            Node::Mapping(outer).to_value(),
            json!({"server": {"host": "localhost"}, "ports": [8080, 8081]})
        );
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let node = Node::leaf("timeout", json!(5000));
        let encoded = serde_json::to_value(&node).unwrap();
        assert_eq!(
            encoded,
            json!({"kind": "leaf", "name": "timeout", "valueType": "number", "value": 5000})
        );
    }
}
