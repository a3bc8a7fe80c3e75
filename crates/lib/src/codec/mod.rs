//! Lossless serialization of stores.
//!
//! Two forms are supported, both round-tripping without data loss:
//!
//! * **Snapshot** ([`snapshot`]): the node tree as JSON, preserving every
//!   structural detail (node kinds, module flags, value types). This is the
//!   persistence format.
//! * **Structured text** ([`text`]): a YAML rendition for humans and for
//!   language models. Chains of single-child mappings collapse into
//!   slash-joined keys, module boundaries appear as a `$module: true`
//!   marker, and multi-line strings render as block literals.
//!
//! The checkpoint log is deliberately not serialized. A store decoded from
//! either form starts with an empty log, so its first checkpoint records the
//! full decoded state.

mod errors;
mod snapshot;
mod text;

pub use errors::CodecError;
pub use text::MODULE_MARKER;
