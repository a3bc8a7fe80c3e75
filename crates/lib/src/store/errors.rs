//! Error types for store operations.

use thiserror::Error;

use crate::node::NodeKind;
use crate::path::TreePath;

/// Structured error types for path-addressed store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A segment was absent during traversal, or the explicit target of a
    /// read or delete is missing.
    #[error("node not found: {path}")]
    NotFound { path: TreePath },

    /// The node kind at a path position disagrees with what the operation or
    /// the next segment requires.
    #[error("expected {expected} but found {actual} at {}", path.highlight(*segment))]
    TypeMismatch {
        path: TreePath,
        /// Position of the offending segment within `path`.
        segment: usize,
        expected: &'static str,
        actual: NodeKind,
    },

    /// A structured insert was given a value it cannot decompose.
    #[error("cannot merge into {path}: {reason}")]
    Merge { path: TreePath, reason: String },
}

impl StoreError {
    /// Check if this error indicates a missing node.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if this error indicates a node kind conflict.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, StoreError::TypeMismatch { .. })
    }

    /// Check if this error came from a rejected structured insert.
    pub fn is_merge(&self) -> bool {
        matches!(self, StoreError::Merge { .. })
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
