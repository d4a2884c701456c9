//! Tree construction.

/// The tree builder.
pub mod core;
/// Noise patterns vaulted before tree building.
pub mod noise;
/// Void, block and optional-closing tag tables.
pub mod tags;

pub use core::HTMLParser;
