//! Document model for the loupe HTML toolkit.
//!
//! A [`Document`] owns one append-only table of [`Node`]s. Every node is
//! addressed by a [`NodeId`] handle equal to its table index; handles are
//! handed out in document order and never reused, so they double as the
//! ordering key for query results and as the bounds of descendant ranges.
//!
//! # Design
//!
//! Relationships (`parent`, `content`, `children`) are stored as handles,
//! never as references, so the table is the sole owner of node storage.
//! Removing a node clears its slot (and its subtree's) instead of compacting
//! the table, which keeps every other handle valid.
//!
//! Markup that the tokenizer must not look inside (scripts, styles,
//! comments, ...) lives in the document's [`NoiseVault`] and is restored
//! lazily whenever text is read back out.

mod attributes;
mod debug;
mod document;
mod mutation;
mod node;
mod noise;
mod serialize;

use std::fmt;

use serde::Serialize;

pub use attributes::{AttrSpacing, AttrValue, Attribute, Attributes, QuoteStyle};
pub use document::{
    AncestorIterator, Document, DocumentSettings, DomError, IssueKind, ParseIssue,
};
pub use mutation::Accessor;
pub use node::{Node, NodeKind};
pub use noise::{NOISE_PREFIX, NoiseVault, PLACEHOLDER_LEN};

/// A stable handle into a [`Document`]'s node table.
///
/// Handles are assigned in creation order and are never reassigned, so
/// comparing two handles compares document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: Self = Self(0);

    /// Table index of this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
