//! Error types for checkpoint operations.

use thiserror::Error;

/// Structured error types for the versioning engine.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// A restore named a checkpoint index outside the recorded log.
    #[error("invalid checkpoint {index}: {len} checkpoint(s) recorded")]
    InvalidCheckpoint { index: usize, len: usize },
}

// Conversion from VersionError to the main Error type
impl From<VersionError> for crate::Error {
    fn from(err: VersionError) -> Self {
        crate::Error::Version(err)
    }
}
