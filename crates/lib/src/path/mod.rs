//! Path addressing for the store.
//!
//! A path is an ordered sequence of segments, written as `/`-delimited text.
//! Segments are either mapping keys or 1-based sequence indices; which one a
//! segment is gets decided by [`classify`], never declared by the caller.
//!
//! # Usage
//!
//! ```
//! use arbor::TreePath;
//!
//! let path: TreePath = "users/1/profile/name".parse().unwrap();
//! assert_eq!(path.len(), 4);
//! assert_eq!(path.last(), Some("name"));
//! assert_eq!(path.parent().unwrap().to_string(), "users/1/profile");
//! ```

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

mod errors;

pub use errors::SegmentError;

/// Characters that may never appear in a path segment.
pub const FORBIDDEN_CHARACTERS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '#'];

/// An owned, ordered sequence of path segments addressing one node.
///
/// The empty path addresses the store root. Parsing does not validate
/// segments; validation happens when a store operation walks the path, so a
/// malformed path is representable but never usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    /// Creates the empty path, addressing the store root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits path text on `/` into segments, verbatim.
    ///
    /// The empty string parses to the root path. No other normalization is
    /// applied: `"a//b"` keeps its empty middle segment and is rejected by
    /// validation later.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::new();
        }
        Self {
            segments: text.split('/').map(str::to_string).collect(),
        }
    }

    /// Returns the segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last segment, or `None` for the root path.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the parent path, or `None` for the root path.
    pub fn parent(&self) -> Option<TreePath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(TreePath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns the prefix holding the first `n` segments.
    pub fn prefix(&self, n: usize) -> TreePath {
        TreePath {
            segments: self.segments[..n.min(self.segments.len())].to_vec(),
        }
    }

    /// Appends a segment in place.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> TreePath {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }

    /// Renders the path with the segment at `index` highlighted, for error
    /// messages pointing at the offending position.
    pub fn highlight(&self, index: usize) -> String {
        let mut parts = Vec::with_capacity(self.segments.len());
        for (i, segment) in self.segments.iter().enumerate() {
            if i == index {
                parts.push(format!(">>>{segment}<<<"));
            } else {
                parts.push(segment.clone());
            }
        }
        parts.join("/")
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.segments.join("/"))
        }
    }
}

impl FromStr for TreePath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for TreePath {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for TreePath {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<Vec<String>> for TreePath {
    fn from(segments: Vec<String>) -> Self {
        TreePath { segments }
    }
}

impl From<&[&str]> for TreePath {
    fn from(segments: &[&str]) -> Self {
        TreePath {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for TreePath {
    fn from(segments: [&str; N]) -> Self {
        TreePath {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<&TreePath> for TreePath {
    fn from(path: &TreePath) -> Self {
        path.clone()
    }
}

/// Classification of one segment: a mapping key or a sequence position.
///
/// Indices are already converted to the internal 0-based form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A mapping key.
    Name(&'a str),
    /// A 0-based sequence index (1-based in path text).
    Index(usize),
}

/// Validates a single segment against the character rules.
pub fn validate_segment(segment: &str) -> std::result::Result<(), SegmentError> {
    if segment.is_empty() {
        return Err(SegmentError::Empty);
    }
    if segment.contains(FORBIDDEN_CHARACTERS) {
        return Err(SegmentError::ForbiddenCharacter {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

/// Classifies a segment as a mapping key or a sequence index.
///
/// A segment is an index iff it consists of digits only and its value is at
/// least 1; leading zeros are allowed. Anything else that still looks numeric
/// (`"0"`, `"-0"`, `"-1"`, `"1.5"`) is a malformed index and an error, never a
/// mapping key.
pub fn classify(segment: &str) -> std::result::Result<Segment<'_>, SegmentError> {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        return match segment.parse::<usize>() {
            Ok(position) if position >= 1 => Ok(Segment::Index(position - 1)),
            _ => Err(SegmentError::InvalidIndex {
                segment: segment.to_string(),
            }),
        };
    }
    if looks_numeric(segment) {
        return Err(SegmentError::InvalidIndex {
            segment: segment.to_string(),
        });
    }
    Ok(Segment::Name(segment))
}

/// True for segments made of an optional minus sign, digits, and at most one
/// decimal point. These are rejected as indices rather than used as keys.
fn looks_numeric(segment: &str) -> bool {
    let body = segment.strip_prefix('-').unwrap_or(segment);
    if body.is_empty() {
        return false;
    }
    let mut saw_digit = false;
    let mut dots = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => saw_digit = true,
            '.' => dots += 1,
            _ => return false,
        }
    }
    saw_digit && dots <= 1
}
