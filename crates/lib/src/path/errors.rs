//! Error types for path parsing and segment classification.

use thiserror::Error;

/// Structured error type for malformed path segments.
///
/// A segment is rejected outright when it is empty or contains a forbidden
/// character, and a numeric-looking segment that does not form a valid
/// 1-based sequence index is an error rather than a mapping key.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The segment (or the whole path, for root-level misuse) is empty.
    #[error("empty path segment")]
    Empty,

    /// The segment contains one of the forbidden characters `/ \ : * ? " < > | #`.
    #[error("invalid character in path segment '{segment}'")]
    ForbiddenCharacter { segment: String },

    /// The segment looks numeric but is not a valid 1-based index.
    #[error("invalid list index '{segment}'")]
    InvalidIndex { segment: String },
}

// Conversion from SegmentError to the main Error type
impl From<SegmentError> for crate::Error {
    fn from(err: SegmentError) -> Self {
        crate::Error::Segment(err)
    }
}
