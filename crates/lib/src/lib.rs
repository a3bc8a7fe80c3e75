//!
//! Arbor: a path-addressable hierarchical store with checkpointed history.
//!
//! Arbor is the persistent substrate of an orchestration system: schemas,
//! generated functions, execution traces, and application data all live in one
//! tree of nodes, and every other subsystem reads and writes that tree through
//! a narrow path-based API.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: A closed variant of mapping, sequence, and leaf
//!   nodes. Mappings own uniquely-named children, sequences own ordered
//!   children, leaves hold opaque values.
//! * **Paths (`path::TreePath`)**: `/`-delimited addresses. Numeric segments
//!   address sequence positions and are 1-based in path text.
//! * **Store (`store::Store`)**: The session object owning the root node and
//!   all CRUD operations addressed by path. One logical writer per store;
//!   concurrent tasks get independent store instances.
//! * **Checkpoints (`version`)**: `set_checkpoint` records a structural diff
//!   against the last retained snapshot; `restore` replays a prefix of the
//!   diff log onto an empty root.
//! * **Codecs (`codec`)**: A lossless structural snapshot form (JSON) and a
//!   human-editable structured-text form (YAML), both round-tripping exactly.

pub mod codec;
pub mod node;
pub mod path;
pub mod store;
pub mod version;

pub use node::{LeafNode, MappingNode, Node, NodeKind, SequenceNode, ValueType};
pub use path::TreePath;
pub use store::Store;

/// Result type used throughout the Arbor library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Arbor library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Malformed path segments from the path module
    #[error(transparent)]
    Segment(path::SegmentError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured versioning errors from the version module
    #[error(transparent)]
    Version(version::VersionError),

    /// Structured codec errors from the codec module
    #[error(transparent)]
    Codec(codec::CodecError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Segment(_) => "path",
            Error::Store(_) => "store",
            Error::Version(_) => "version",
            Error::Codec(_) => "codec",
        }
    }

    /// Check if this error indicates a node was absent during traversal.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a node kind disagreed with an operation.
    pub fn is_type_mismatch(&self) -> bool {
        match self {
            Error::Store(err) => err.is_type_mismatch(),
            _ => false,
        }
    }

    /// Check if this error came from a malformed path segment.
    pub fn is_segment_error(&self) -> bool {
        matches!(self, Error::Segment(_))
    }

    /// Check if this error came from inserting a non-mergeable value.
    pub fn is_merge_error(&self) -> bool {
        match self {
            Error::Store(err) => err.is_merge(),
            _ => false,
        }
    }

    /// Check if this error rejected a checkpoint index.
    pub fn is_invalid_checkpoint(&self) -> bool {
        matches!(
            self,
            Error::Version(version::VersionError::InvalidCheckpoint { .. })
        )
    }

    /// Check if this error is codec-related.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Error::Codec(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
