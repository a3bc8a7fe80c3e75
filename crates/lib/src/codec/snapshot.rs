//! The JSON snapshot codec.
//!
//! A snapshot is the root node serialized through its serde representation:
//! every node is an object tagged with a `kind` field, so the decoded tree is
//! structurally identical to the encoded one.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::codec::CodecError;
use crate::node::Node;
use crate::store::Store;
use crate::Result;

impl Store {
    /// Encodes the tree as a pretty-printed JSON snapshot.
    pub fn to_snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.root())?)
    }

    /// Decodes a snapshot into a new store.
    ///
    /// The decoded store has no checkpoints; its first checkpoint records
    /// the full decoded state.
    pub fn from_snapshot(text: &str) -> Result<Store> {
        let root: Node = serde_json::from_str(text)?;
        match root {
            Node::Mapping(_) => Ok(Store::from_root(root)),
            other => Err(CodecError::InvalidSnapshot {
                reason: format!("root must be a mapping, got {}", other.kind()),
            }
            .into()),
        }
    }

    /// Writes a snapshot of the tree to a file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "saving snapshot");
        fs::write(path, self.to_snapshot()?)?;
        Ok(())
    }

    /// Reads a snapshot file into a new store.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Store> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading snapshot");
        let text = fs::read_to_string(path)?;
        Self::from_snapshot(&text)
    }
}
