//! Error types for the snapshot and structured-text codecs.

use thiserror::Error;

/// Structured error types for serialization and deserialization.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// A snapshot document decoded but does not describe a valid store.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// A structured-text document decoded but does not describe a valid store.
    #[error("invalid structured text: {reason}")]
    InvalidText { reason: String },

    /// The YAML layer rejected the document outright.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Conversion from CodecError to the main Error type
impl From<CodecError> for crate::Error {
    fn from(err: CodecError) -> Self {
        crate::Error::Codec(err)
    }
}
