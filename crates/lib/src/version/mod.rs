//! Checkpointing and restore.
//!
//! A checkpoint records the structural difference between the live tree and
//! the tree as of the previous checkpoint. The store keeps the full sequence
//! of these changesets; restoring checkpoint `k` replays changesets `0..=k`
//! onto an empty root, so a restored store always reflects exactly the state
//! that was checkpointed.
//!
//! Changesets are ordered for safe replay: within a sequence, in-place
//! changes and appends come in ascending index order and removals in
//! descending order, so earlier removals never shift the addresses of later
//! ones.
//!
//! # Usage
//!
//! ```
//! use arbor::Store;
//! use serde_json::json;
//!
//! let mut store = Store::new();
//! store.set("config/mode", json!("draft"))?;
//! let first = store.set_checkpoint();
//! store.set("config/mode", json!("final"))?;
//! store.set_checkpoint();
//!
//! let restored = store.restore(first)?;
//! assert_eq!(restored.get("config/mode")?, json!("draft"));
//! # Ok::<(), arbor::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::node::Node;
use crate::path::TreePath;
use crate::store::Store;
use crate::Result;

mod errors;

pub use errors::VersionError;

/// One recorded mutation: an operation applied at a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: TreePath,
    #[serde(flatten)]
    pub op: ChangeOp,
}

/// The operation part of a [`Change`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ChangeOp {
    /// A node appeared under a parent that lacked it.
    Add { node: Node },
    /// The node at the path was replaced wholesale, including any subtree.
    Replace { node: Node },
    /// The node at the path was removed.
    Remove,
}

/// All changes recorded by one checkpoint, in replay order.
pub type Changeset = Vec<Change>;

impl Store {
    /// Records a checkpoint: diffs the live tree against the previous
    /// checkpoint's state, appends the changeset to the log, and returns the
    /// new checkpoint's index.
    ///
    /// A checkpoint with no intervening mutations records an empty changeset
    /// and still gets its own index.
    pub fn set_checkpoint(&mut self) -> usize {
        let mut changes = Changeset::new();
        diff_nodes(&self.last_version, self.root(), &TreePath::new(), &mut changes);
        let index = self.diff_log.len();
        debug!(checkpoint = index, changes = changes.len(), "set checkpoint");
        self.diff_log.push(changes);
        self.last_version = self.root().clone();
        index
    }

    /// Number of checkpoints recorded so far.
    pub fn checkpoint_count(&self) -> usize {
        self.diff_log.len()
    }

    /// The changeset recorded by one checkpoint.
    pub fn changeset(&self, checkpoint: usize) -> Result<&Changeset> {
        self.diff_log
            .get(checkpoint)
            .ok_or_else(|| {
                VersionError::InvalidCheckpoint {
                    index: checkpoint,
                    len: self.diff_log.len(),
                }
                .into()
            })
    }

    /// Builds a new store holding the state as of checkpoint `checkpoint`,
    /// by replaying changesets `0..=checkpoint` onto an empty root.
    ///
    /// The original store is untouched; the restored store starts a fresh
    /// checkpoint log of its own.
    pub fn restore(&self, checkpoint: usize) -> Result<Store> {
        if checkpoint >= self.diff_log.len() {
            return Err(VersionError::InvalidCheckpoint {
                index: checkpoint,
                len: self.diff_log.len(),
            }
            .into());
        }
        debug!(checkpoint, "restore");
        let mut restored = Store::new();
        for changeset in &self.diff_log[..=checkpoint] {
            for change in changeset {
                restored.apply(change)?;
            }
        }
        restored.last_version = restored.root().clone();
        Ok(restored)
    }

    fn apply(&mut self, change: &Change) -> Result<()> {
        match &change.op {
            ChangeOp::Add { node } | ChangeOp::Replace { node } => {
                self.set_node(&change.path, node.clone())
            }
            ChangeOp::Remove => self.delete(&change.path),
        }
    }
}

/// Recursive structural diff. Containers of the same kind are compared
/// child-by-child; everything else that differs becomes a single `Replace`
/// of the whole subtree.
fn diff_nodes(old: &Node, new: &Node, path: &TreePath, out: &mut Changeset) {
    match (old, new) {
        (Node::Mapping(old_map), Node::Mapping(new_map))
            if old_map.is_module == new_map.is_module =>
        {
            for (key, old_child) in &old_map.children {
                match new_map.children.get(key) {
                    Some(new_child) => {
                        diff_nodes(old_child, new_child, &path.join(key.clone()), out);
                    }
                    None => out.push(Change {
                        path: path.join(key.clone()),
                        op: ChangeOp::Remove,
                    }),
                }
            }
            for (key, new_child) in &new_map.children {
                if !old_map.children.contains_key(key) {
                    out.push(Change {
                        path: path.join(key.clone()),
                        op: ChangeOp::Add {
                            node: new_child.clone(),
                        },
                    });
                }
            }
        }
        (Node::Sequence(old_seq), Node::Sequence(new_seq)) => {
            let shared = old_seq.children.len().min(new_seq.children.len());
            for i in 0..shared {
                diff_nodes(
                    &old_seq.children[i],
                    &new_seq.children[i],
                    &path.join((i + 1).to_string()),
                    out,
                );
            }
            for (i, new_child) in new_seq.children.iter().enumerate().skip(shared) {
                out.push(Change {
                    path: path.join((i + 1).to_string()),
                    op: ChangeOp::Add {
                        node: new_child.clone(),
                    },
                });
            }
            for i in (shared..old_seq.children.len()).rev() {
                out.push(Change {
                    path: path.join((i + 1).to_string()),
                    op: ChangeOp::Remove,
                });
            }
        }
        _ => {
            if old != new {
                out.push(Change {
                    path: path.clone(),
                    op: ChangeOp::Replace { node: new.clone() },
                });
            }
        }
    }
}
