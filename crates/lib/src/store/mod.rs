//! The path-addressed node store.
//!
//! [`Store`] owns one root mapping and exposes every read and write as an
//! operation on a [`TreePath`]. Writes auto-create missing intermediate
//! containers, choosing the container kind from the following segment:
//! a numeric segment means its parent must be a sequence, anything else a
//! mapping. Reads never create anything.
//!
//! A store is a single-writer session object. Nothing here locks; callers
//! that need concurrency give each task its own store and reconcile through
//! snapshots.
//!
//! # Usage
//!
//! ```
//! use arbor::Store;
//! use serde_json::json;
//!
//! let mut store = Store::new();
//! store.set("config/server/host", json!("localhost"))?;
//! store.push("config/server/ports", json!(8080))?;
//! assert_eq!(store.get("config/server/ports/1")?, json!(8080));
//! # Ok::<(), arbor::Error>(())
//! ```

use serde_json::Value;
use tracing::trace;

use crate::node::{LeafNode, MappingNode, Node, NodeKind, SequenceNode};
use crate::path::{classify, validate_segment, Segment, SegmentError, TreePath};
use crate::version::Changeset;
use crate::Result;

mod errors;

pub use errors::StoreError;

const KIND_MAPPING: &str = "mapping";
const KIND_SEQUENCE: &str = "sequence";
const KIND_LEAF: &str = "leaf";
const KIND_CONTAINER: &str = "mapping or sequence";

/// The hierarchical store: one root node plus the checkpoint log.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    root: Node,
    /// Deep copy of the tree as of the last checkpoint. Diffed against the
    /// live root when the next checkpoint is taken.
    pub(crate) last_version: Node,
    /// One changeset per checkpoint, in checkpoint order.
    pub(crate) diff_log: Vec<Changeset>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a write lands: a keyed slot in a mapping or a position in a
/// sequence. Holds the parent mutably so the caller can place or remove a
/// child without re-walking the path.
enum Slot<'a> {
    Mapping(&'a mut MappingNode, String),
    Sequence(&'a mut SequenceNode, usize),
}

impl Store {
    /// Creates an empty store: a root mapping flagged as a module boundary,
    /// no checkpoints.
    pub fn new() -> Self {
        Store {
            root: Node::root(),
            last_version: Node::root(),
            diff_log: Vec::new(),
        }
    }

    /// Builds a store around an existing root. The checkpoint log starts
    /// empty, so the first checkpoint records the full tree.
    pub(crate) fn from_root(root: Node) -> Self {
        Store {
            root,
            last_version: Node::root(),
            diff_log: Vec::new(),
        }
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    // --- reads -----------------------------------------------------------

    /// Resolves a path to the node it addresses, of any kind.
    ///
    /// Traversal errors distinguish three cases per segment: the segment is
    /// malformed ([`SegmentError`]), the node is absent
    /// ([`StoreError::NotFound`]), or the parent kind disagrees with the
    /// segment form ([`StoreError::TypeMismatch`]).
    pub fn get_node(&self, path: impl Into<TreePath>) -> Result<&Node> {
        let path = path.into();
        let mut current = &self.root;
        for i in 0..path.len() {
            current = Self::child(current, &path, i)?;
        }
        Ok(current)
    }

    /// Like [`get_node`](Store::get_node) but rejects leaves.
    pub fn get_container(&self, path: impl Into<TreePath>) -> Result<&Node> {
        let path = path.into();
        let node = self.get_node(&path)?;
        match node {
            Node::Leaf(_) => Err(StoreError::TypeMismatch {
                segment: path.len().saturating_sub(1),
                path,
                expected: KIND_CONTAINER,
                actual: NodeKind::Leaf,
            }
            .into()),
            _ => Ok(node),
        }
    }

    /// Resolves a path that must address a mapping node.
    pub fn get_mapping(&self, path: impl Into<TreePath>) -> Result<&MappingNode> {
        let path = path.into();
        match self.get_node(&path)? {
            Node::Mapping(mapping) => Ok(mapping),
            other => {
                let actual = other.kind();
                Err(StoreError::TypeMismatch {
                    segment: path.len().saturating_sub(1),
                    path,
                    expected: KIND_MAPPING,
                    actual,
                }
                .into())
            }
        }
    }

    /// Resolves a path that must address a sequence node.
    pub fn get_sequence(&self, path: impl Into<TreePath>) -> Result<&SequenceNode> {
        let path = path.into();
        match self.get_node(&path)? {
            Node::Sequence(sequence) => Ok(sequence),
            other => {
                let actual = other.kind();
                Err(StoreError::TypeMismatch {
                    segment: path.len().saturating_sub(1),
                    path,
                    expected: KIND_SEQUENCE,
                    actual,
                }
                .into())
            }
        }
    }

    /// Resolves a path that must address a leaf node.
    pub fn get_leaf(&self, path: impl Into<TreePath>) -> Result<&LeafNode> {
        let path = path.into();
        match self.get_node(&path)? {
            Node::Leaf(leaf) => Ok(leaf),
            other => {
                let actual = other.kind();
                Err(StoreError::TypeMismatch {
                    segment: path.len().saturating_sub(1),
                    path,
                    expected: KIND_LEAF,
                    actual,
                }
                .into())
            }
        }
    }

    /// Reads a leaf's raw value.
    pub fn get(&self, path: impl Into<TreePath>) -> Result<Value> {
        let path = path.into();
        Ok(self.get_leaf(path)?.value.clone())
    }

    /// Fully dereferences the subtree at a path into plain values.
    pub fn materialize(&self, path: impl Into<TreePath>) -> Result<Value> {
        Ok(self.get_node(path)?.to_value())
    }

    /// Whether a container (mapping or sequence) exists at this path.
    /// Traversal errors of any kind count as absence.
    pub fn node_exists(&self, path: impl Into<TreePath>) -> bool {
        self.get_container(path).is_ok()
    }

    /// Walks up from a path to the nearest enclosing module boundary and
    /// returns its path. The root is a module, so this always resolves as
    /// long as every prefix of the path exists.
    pub fn find_module(&self, path: impl Into<TreePath>) -> Result<TreePath> {
        let path = path.into();
        for i in (0..=path.len()).rev() {
            let prefix = path.prefix(i);
            if let Node::Mapping(mapping) = self.get_node(&prefix)? {
                if mapping.is_module {
                    return Ok(prefix);
                }
            }
        }
        Ok(TreePath::new())
    }

    // --- writes ----------------------------------------------------------

    /// Stores a raw value as a leaf, replacing whatever node was there.
    /// Missing ancestors are created.
    ///
    /// The value is opaque: objects and arrays are stored as-is, not
    /// decomposed. Use [`insert`](Store::insert) for structural merging.
    pub fn set(&mut self, path: impl Into<TreePath>, value: impl Into<Value>) -> Result<()> {
        let path = path.into();
        trace!(%path, "set leaf");
        self.place_leaf(&path, value.into(), true)
    }

    /// Structurally merges a value at a path: objects become mappings,
    /// arrays become sequences, primitives become leaves, recursively.
    /// Existing siblings not named by the value are left untouched.
    pub fn insert(&mut self, path: impl Into<TreePath>, value: impl Into<Value>) -> Result<()> {
        let path = path.into();
        trace!(%path, "insert value");
        self.insert_value(&path, value.into())
    }

    /// Like [`insert`](Store::insert) but only accepts objects and arrays;
    /// a primitive is a [`StoreError::Merge`] error.
    pub fn insert_object(
        &mut self,
        path: impl Into<TreePath>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let path = path.into();
        match value.into() {
            Value::Object(entries) => self.insert_mapping_entries(&path, entries),
            Value::Array(items) => self.insert_sequence_items(&path, items),
            other => Err(StoreError::Merge {
                path,
                reason: format!(
                    "can only insert objects or arrays, got {}",
                    json_type_name(&other)
                ),
            }
            .into()),
        }
    }

    /// Appends a value to the sequence at a path, creating the sequence if
    /// absent, and returns the path of the new element (1-based index text).
    pub fn push(&mut self, path: impl Into<TreePath>, value: impl Into<Value>) -> Result<TreePath> {
        let path = path.into();
        let length = match self.get_sequence(&path) {
            Ok(sequence) => sequence.children.len(),
            Err(err) if err.is_not_found() => {
                self.create_sequence(&path)?;
                0
            }
            Err(err) => return Err(err),
        };
        let element_path = path.join((length + 1).to_string());
        self.insert_value(&element_path, value.into())?;
        trace!(path = %element_path, "pushed sequence element");
        Ok(element_path)
    }

    /// Creates an empty mapping at a path, along with missing ancestors.
    /// Idempotent when a mapping is already there; any other kind is a
    /// [`StoreError::TypeMismatch`].
    pub fn create_mapping(&mut self, path: impl Into<TreePath>) -> Result<()> {
        let path = path.into();
        let node = self.ensure_path(&path, false)?;
        match node {
            Node::Mapping(_) => Ok(()),
            other => {
                let actual = other.kind();
                Err(StoreError::TypeMismatch {
                    segment: path.len().saturating_sub(1),
                    path,
                    expected: KIND_MAPPING,
                    actual,
                }
                .into())
            }
        }
    }

    /// Creates an empty sequence at a path, along with missing ancestors.
    /// Idempotent when a sequence is already there.
    pub fn create_sequence(&mut self, path: impl Into<TreePath>) -> Result<()> {
        let path = path.into();
        if path.is_empty() {
            return Err(SegmentError::Empty.into());
        }
        match self.get_node(&path) {
            Ok(Node::Sequence(_)) => return Ok(()),
            Ok(other) => {
                let actual = other.kind();
                return Err(StoreError::TypeMismatch {
                    segment: path.len().saturating_sub(1),
                    path,
                    expected: KIND_SEQUENCE,
                    actual,
                }
                .into());
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
        let name = match path.last() {
            Some(last) => last.to_string(),
            None => return Err(SegmentError::Empty.into()),
        };
        let slot = self.slot_mut(&path, true)?;
        place(slot, Node::sequence(name));
        Ok(())
    }

    /// Creates a mapping at a path and marks it as a module boundary.
    /// The empty path re-marks the root, which is already a module.
    pub fn create_module(&mut self, path: impl Into<TreePath>) -> Result<()> {
        let path = path.into();
        trace!(%path, "create module");
        let node = self.ensure_path(&path, false)?;
        match node {
            Node::Mapping(mapping) => {
                mapping.is_module = true;
                Ok(())
            }
            other => {
                let actual = other.kind();
                Err(StoreError::TypeMismatch {
                    segment: path.len().saturating_sub(1),
                    path,
                    expected: KIND_MAPPING,
                    actual,
                }
                .into())
            }
        }
    }

    /// Removes the subtree at a path. The target must exist; the root cannot
    /// be deleted. Removing a sequence element shifts later elements down,
    /// so their 1-based addresses change.
    pub fn delete(&mut self, path: impl Into<TreePath>) -> Result<()> {
        let path = path.into();
        if path.is_empty() {
            return Err(SegmentError::Empty.into());
        }
        trace!(%path, "delete subtree");
        match self.slot_mut(&path, false)? {
            Slot::Mapping(mapping, key) => {
                if mapping.children.remove(&key).is_none() {
                    return Err(StoreError::NotFound { path }.into());
                }
            }
            Slot::Sequence(sequence, index) => {
                sequence.children.remove(index);
            }
        }
        Ok(())
    }

    /// Places an already-built node at a path, creating missing ancestors.
    /// Used by change replay and by the text codec.
    pub(crate) fn set_node(&mut self, path: &TreePath, node: Node) -> Result<()> {
        if path.is_empty() {
            self.root = node;
            return Ok(());
        }
        let slot = self.slot_mut(path, true)?;
        place(slot, node);
        Ok(())
    }

    // --- traversal internals ---------------------------------------------

    fn child<'a>(parent: &'a Node, path: &TreePath, i: usize) -> Result<&'a Node> {
        let segment = &path.segments()[i];
        validate_segment(segment)?;
        match parent {
            Node::Leaf(_) => Err(StoreError::TypeMismatch {
                path: path.clone(),
                segment: i.saturating_sub(1),
                expected: KIND_CONTAINER,
                actual: NodeKind::Leaf,
            }
            .into()),
            Node::Mapping(mapping) => match classify(segment)? {
                Segment::Name(name) => match mapping.children.get(name) {
                    Some(child) => Ok(child),
                    None => Err(StoreError::NotFound {
                        path: path.prefix(i + 1),
                    }
                    .into()),
                },
                Segment::Index(_) => Err(StoreError::TypeMismatch {
                    path: path.clone(),
                    segment: i,
                    expected: KIND_SEQUENCE,
                    actual: NodeKind::Mapping,
                }
                .into()),
            },
            Node::Sequence(sequence) => match classify(segment)? {
                Segment::Index(index) => {
                    // One past the end is "not found"; anything further out
                    // is a malformed address for this sequence.
                    if index > sequence.children.len() {
                        Err(SegmentError::InvalidIndex {
                            segment: segment.clone(),
                        }
                        .into())
                    } else {
                        match sequence.children.get(index) {
                            Some(child) => Ok(child),
                            None => Err(StoreError::NotFound {
                                path: path.prefix(i + 1),
                            }
                            .into()),
                        }
                    }
                }
                Segment::Name(_) => Err(StoreError::TypeMismatch {
                    path: path.clone(),
                    segment: i,
                    expected: KIND_MAPPING,
                    actual: NodeKind::Sequence,
                }
                .into()),
            },
        }
    }

    fn child_mut<'a>(parent: &'a mut Node, path: &TreePath, i: usize) -> Result<&'a mut Node> {
        let segment = &path.segments()[i];
        validate_segment(segment)?;
        match parent {
            Node::Leaf(_) => Err(StoreError::TypeMismatch {
                path: path.clone(),
                segment: i.saturating_sub(1),
                expected: KIND_CONTAINER,
                actual: NodeKind::Leaf,
            }
            .into()),
            Node::Mapping(mapping) => match classify(segment)? {
                Segment::Name(name) => match mapping.children.get_mut(name) {
                    Some(child) => Ok(child),
                    None => Err(StoreError::NotFound {
                        path: path.prefix(i + 1),
                    }
                    .into()),
                },
                Segment::Index(_) => Err(StoreError::TypeMismatch {
                    path: path.clone(),
                    segment: i,
                    expected: KIND_SEQUENCE,
                    actual: NodeKind::Mapping,
                }
                .into()),
            },
            Node::Sequence(sequence) => match classify(segment)? {
                Segment::Index(index) => {
                    if index > sequence.children.len() {
                        Err(SegmentError::InvalidIndex {
                            segment: segment.clone(),
                        }
                        .into())
                    } else {
                        match sequence.children.get_mut(index) {
                            Some(child) => Ok(child),
                            None => Err(StoreError::NotFound {
                                path: path.prefix(i + 1),
                            }
                            .into()),
                        }
                    }
                }
                Segment::Name(_) => Err(StoreError::TypeMismatch {
                    path: path.clone(),
                    segment: i,
                    expected: KIND_MAPPING,
                    actual: NodeKind::Sequence,
                }
                .into()),
            },
        }
    }

    pub(crate) fn get_node_mut(&mut self, path: &TreePath) -> Result<&mut Node> {
        let mut current = &mut self.root;
        for i in 0..path.len() {
            current = Self::child_mut(current, path, i)?;
        }
        Ok(current)
    }

    /// Walks a path, creating missing containers along the way, and returns
    /// the final node. With `skip_last` the walk stops one segment short,
    /// returning the parent of the addressed node.
    ///
    /// All segments are validated up front, so a malformed tail segment
    /// never leaves partially-created ancestors behind.
    fn ensure_path(&mut self, path: &TreePath, skip_last: bool) -> Result<&mut Node> {
        for segment in path.segments() {
            validate_segment(segment)?;
            classify(segment)?;
        }
        let end = if skip_last {
            path.len().saturating_sub(1)
        } else {
            path.len()
        };
        let mut current = &mut self.root;
        for i in 0..end {
            current = Self::ensure_child(current, path, i)?;
        }
        Ok(current)
    }

    fn ensure_child<'a>(parent: &'a mut Node, path: &TreePath, i: usize) -> Result<&'a mut Node> {
        let segment = &path.segments()[i];
        let next = path.segments().get(i + 1);
        let next_numeric = next.is_some_and(|s| matches!(classify(s), Ok(Segment::Index(_))));
        let child: &mut Node = match parent {
            Node::Leaf(_) => {
                return Err(StoreError::TypeMismatch {
                    path: path.clone(),
                    segment: i.saturating_sub(1),
                    expected: KIND_CONTAINER,
                    actual: NodeKind::Leaf,
                }
                .into())
            }
            Node::Mapping(mapping) => match classify(segment)? {
                Segment::Name(name) => mapping
                    .children
                    .entry(name.to_string())
                    .or_insert_with(|| new_container(segment, next_numeric)),
                Segment::Index(_) => {
                    return Err(StoreError::TypeMismatch {
                        path: path.clone(),
                        segment: i,
                        expected: KIND_SEQUENCE,
                        actual: NodeKind::Mapping,
                    }
                    .into())
                }
            },
            Node::Sequence(sequence) => match classify(segment)? {
                Segment::Index(index) => {
                    if index > sequence.children.len() {
                        return Err(SegmentError::InvalidIndex {
                            segment: segment.clone(),
                        }
                        .into());
                    }
                    if index == sequence.children.len() {
                        sequence.children.push(new_container(segment, next_numeric));
                    }
                    &mut sequence.children[index]
                }
                Segment::Name(_) => {
                    return Err(StoreError::TypeMismatch {
                        path: path.clone(),
                        segment: i,
                        expected: KIND_MAPPING,
                        actual: NodeKind::Sequence,
                    }
                    .into())
                }
            },
        };
        // A pre-existing child must have the kind the next segment demands.
        if next.is_some() {
            let expected = if next_numeric {
                NodeKind::Sequence
            } else {
                NodeKind::Mapping
            };
            if child.kind() != expected {
                let actual = child.kind();
                return Err(StoreError::TypeMismatch {
                    path: path.clone(),
                    segment: i,
                    expected: if next_numeric { KIND_SEQUENCE } else { KIND_MAPPING },
                    actual,
                }
                .into());
            }
        }
        Ok(child)
    }

    /// Resolves a path to the slot its last segment addresses. With
    /// `create_parents` missing ancestors are created and a sequence slot
    /// may sit one past the end (an append); without it the parent must
    /// already exist and a sequence slot must be in bounds.
    fn slot_mut(&mut self, path: &TreePath, create_parents: bool) -> Result<Slot<'_>> {
        let last = match path.last() {
            Some(last) => last.to_string(),
            None => return Err(SegmentError::Empty.into()),
        };
        validate_segment(&last)?;
        let segment = classify(&last)?;
        let parent: &mut Node = if create_parents {
            self.ensure_path(path, true)?
        } else {
            let parent_path = path.prefix(path.len() - 1);
            self.get_node_mut(&parent_path)?
        };
        match segment {
            Segment::Name(_) => match parent {
                Node::Mapping(mapping) => Ok(Slot::Mapping(mapping, last)),
                other => {
                    let actual = other.kind();
                    Err(StoreError::TypeMismatch {
                        path: path.clone(),
                        segment: path.len() - 1,
                        expected: KIND_MAPPING,
                        actual,
                    }
                    .into())
                }
            },
            Segment::Index(index) => match parent {
                Node::Sequence(sequence) => {
                    let len = sequence.children.len();
                    if create_parents && index > len {
                        Err(SegmentError::InvalidIndex { segment: last }.into())
                    } else if !create_parents && index >= len {
                        Err(StoreError::NotFound { path: path.clone() }.into())
                    } else {
                        Ok(Slot::Sequence(sequence, index))
                    }
                }
                other => {
                    let actual = other.kind();
                    Err(StoreError::TypeMismatch {
                        path: path.clone(),
                        segment: path.len() - 1,
                        expected: KIND_SEQUENCE,
                        actual,
                    }
                    .into())
                }
            },
        }
    }

    // --- insert internals ------------------------------------------------

    fn place_leaf(&mut self, path: &TreePath, value: Value, create_parents: bool) -> Result<()> {
        let name = match path.last() {
            Some(last) => last.to_string(),
            None => return Err(SegmentError::Empty.into()),
        };
        let slot = self.slot_mut(path, create_parents)?;
        place(slot, Node::leaf(name, value));
        Ok(())
    }

    fn insert_value(&mut self, path: &TreePath, value: Value) -> Result<()> {
        match value {
            Value::Object(entries) => self.insert_mapping_entries(path, entries),
            Value::Array(items) => self.insert_sequence_items(path, items),
            primitive => self.place_leaf(path, primitive, true),
        }
    }

    fn insert_mapping_entries(
        &mut self,
        path: &TreePath,
        entries: serde_json::Map<String, Value>,
    ) -> Result<()> {
        let exists = match self.get_mapping(path) {
            Ok(_) => true,
            Err(err) if err.is_not_found() => false,
            Err(err) => return Err(err),
        };
        if !exists {
            self.create_mapping(path)?;
        }
        for (key, value) in entries {
            self.insert_value(&path.join(key), value)?;
        }
        Ok(())
    }

    fn insert_sequence_items(&mut self, path: &TreePath, items: Vec<Value>) -> Result<()> {
        let exists = match self.get_sequence(path) {
            Ok(_) => true,
            Err(err) if err.is_not_found() => false,
            Err(err) => return Err(err),
        };
        if !exists {
            self.create_sequence(path)?;
        }
        for (i, item) in items.into_iter().enumerate() {
            self.insert_value(&path.join((i + 1).to_string()), item)?;
        }
        Ok(())
    }
}

fn new_container(segment: &str, numeric_child: bool) -> Node {
    if numeric_child {
        Node::sequence(segment)
    } else {
        Node::mapping(segment)
    }
}

fn place(slot: Slot<'_>, node: Node) {
    match slot {
        Slot::Mapping(mapping, key) => {
            mapping.children.insert(key, node);
        }
        Slot::Sequence(sequence, index) => {
            if index == sequence.children.len() {
                sequence.children.push(node);
            } else {
                sequence.children[index] = node;
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
