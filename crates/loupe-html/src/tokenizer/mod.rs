//! Scanning primitives used by the tree builder.

/// Byte-level cursor over the input buffer.
pub mod cursor;
/// Character sets and tag-name grammar.
pub mod helpers;

pub use cursor::Cursor;
