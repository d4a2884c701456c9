//! The node table and tree navigation.

use std::borrow::Cow;
use std::ops::Range;

use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

use crate::NodeId;
use crate::node::{Node, NodeKind};
use crate::noise::NoiseVault;

/// Document-wide settings fixed at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    /// Tag and attribute names were lowercased while parsing.
    pub lowercase: bool,
    /// Inner override given to every `br` element.
    pub br_text: String,
    /// Separator appended after each `span` in plain-text extraction.
    pub span_text: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            lowercase: true,
            br_text: "\r\n".to_string(),
            span_text: " ".to_string(),
        }
    }
}

/// Category of a structural recovery performed by the tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
pub enum IssueKind {
    /// An end tag with no matching open element; kept as literal text.
    UnmatchedEndTag,
    /// A `<` inside what looked like a tag name.
    StrayLessThan,
    /// A tag name that is not an identifier; kept as literal text.
    InvalidTagName,
    /// Input ended inside a start tag.
    UnterminatedTag,
    /// An attribute name directly after `<`.
    MisplacedAttribute,
    /// An element was closed without its own end tag.
    ImplicitClose,
}

/// One recovery recorded while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    /// What happened.
    pub kind: IssueKind,
    /// Byte offset in the (noise-stripped) input.
    pub offset: usize,
    /// Human-readable detail.
    pub message: String,
}

/// Errors from tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The handle was never allocated or its node was removed.
    #[error("node {0} does not exist or was removed")]
    Missing(NodeId),
    /// The root can be neither moved nor removed.
    #[error("the document root cannot be moved or removed")]
    Root,
    /// `append_child` would make a node its own ancestor.
    #[error("cannot append {child} inside its own subtree at {parent}")]
    Cycle {
        /// Intended new parent.
        parent: NodeId,
        /// Node being moved.
        child: NodeId,
    },
}

/// A parsed HTML document: the node table plus the noise vault.
#[derive(Debug, Clone)]
pub struct Document {
    /// Slot `n` holds the node with handle `n`; removed nodes leave `None`.
    nodes: Vec<Option<Node>>,
    noise: NoiseVault,
    settings: DocumentSettings,
    issues: Vec<ParseIssue>,
}

impl Document {
    /// Create a document holding only the root.
    #[must_use]
    pub fn new(settings: DocumentSettings) -> Self {
        Self {
            nodes: vec![Some(Node::root())],
            noise: NoiseVault::new(),
            settings,
            issues: Vec::new(),
        }
    }

    /// The root handle.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Settings this document was built with.
    #[must_use]
    pub const fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    /// The placeholder map.
    #[must_use]
    pub const fn noise(&self) -> &NoiseVault {
        &self.noise
    }

    /// Mutable placeholder map, for filling the vault before tree building.
    pub fn noise_mut(&mut self) -> &mut NoiseVault {
        &mut self.noise
    }

    /// Substitute noise placeholders in `text`.
    #[must_use]
    pub fn restore<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.noise.restore(text)
    }

    /// The first vaulted region (script, comment, ...) containing `needle`.
    #[must_use]
    pub fn search_noise(&self, needle: &str) -> Option<&str> {
        self.noise.search(needle)
    }

    /// Table length, cleared slots included. Every handle is below this.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root occupies slot 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of live (not removed) nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Recoveries recorded while parsing.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Record a recovery.
    pub fn record_issue(&mut self, kind: IssueKind, offset: usize, message: impl Into<String>) {
        self.issues.push(ParseIssue {
            kind,
            offset,
            message: message.into(),
        });
    }

    /// Get a live node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Get a live node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn try_get(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::Missing(id))
    }

    pub(crate) fn try_get_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.get_mut(id).ok_or(DomError::Missing(id))
    }

    /// Handles of every live node in table order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i))
    }

    /// Append `node` to the table and return its handle. The node is not
    /// linked anywhere yet; its `begin` becomes the handle.
    pub fn alloc(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.begin = id.0;
        self.nodes.push(Some(node));
        id
    }

    /// Link `child` as the last content node of `parent` (and as its last
    /// structural child unless `child` is text). Used by tree builders on
    /// freshly allocated nodes; does nothing if either handle is dead.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(structural) = self.get(child).map(|node| node.kind.is_structural()) else {
            return;
        };
        let Some(parent_node) = self.get_mut(parent) else {
            return;
        };
        parent_node.content.push(child);
        if structural {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = Some(parent);
        }
    }

    /// Set the recorded end position of a node.
    pub fn set_end(&mut self, id: NodeId, end: Option<usize>) {
        if let Some(node) = self.get_mut(id) {
            node.end = end;
        }
    }

    /// Kind of a live node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    /// Tag name of a live node (a sentinel for non-elements).
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::tag)
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Structural children (no bare text).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Node::children)
    }

    /// Every nested node, text included.
    #[must_use]
    pub fn content(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Node::content)
    }

    /// First structural child.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Last structural child.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Structural child by position; negative positions count from the end.
    #[must_use]
    pub fn child(&self, id: NodeId, index: isize) -> Option<NodeId> {
        let children = self.children(id);
        let position = if index < 0 {
            children.len().checked_sub(index.unsigned_abs())?
        } else {
            index.unsigned_abs()
        };
        children.get(position).copied()
    }

    /// Returns `true` if the node has any structural child.
    #[must_use]
    pub fn has_child(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    fn sibling_position(&self, id: NodeId) -> Option<(&[NodeId], usize)> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        Some((siblings, position))
    }

    /// The structural sibling after this node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, position) = self.sibling_position(id)?;
        siblings.get(position + 1).copied()
    }

    /// The structural sibling before this node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, position) = self.sibling_position(id)?;
        siblings.get(position.checked_sub(1)?).copied()
    }

    /// This node and every structural sibling after it.
    #[must_use]
    pub fn self_and_following_siblings(&self, id: NodeId) -> &[NodeId] {
        self.sibling_position(id)
            .map_or(&[], |(siblings, position)| &siblings[position..])
    }

    /// Position among structural siblings that share this node's tag.
    #[must_use]
    pub fn same_tag_position(&self, id: NodeId) -> Option<usize> {
        let tag = self.tag(id)?;
        let (siblings, position) = self.sibling_position(id)?;
        Some(
            siblings[..position]
                .iter()
                .filter(|&&sibling| self.tag(sibling) == Some(tag))
                .count(),
        )
    }

    /// Ancestors from the parent up to the root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            document: self,
            current: self.parent(id),
        }
    }

    /// Nearest ancestor with the given tag (case-insensitive).
    #[must_use]
    pub fn find_ancestor_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&ancestor| self.tag(ancestor).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    /// Table slots strictly inside a node, used for descendant scans.
    ///
    /// The root spans the whole table. An element without a recorded end
    /// borrows the end of its nearest ancestor that has one.
    #[must_use]
    pub fn descendant_range(&self, id: NodeId) -> Range<usize> {
        let Some(node) = self.get(id) else {
            return 0..0;
        };
        if node.kind == NodeKind::Root {
            return 1..self.len();
        }
        let end = node
            .end
            .or_else(|| self.ancestors(id).find_map(|a| self.get(a).and_then(Node::end)))
            .unwrap_or(self.len())
            .min(self.len());
        let start = (node.begin + 1).min(end);
        start..end
    }

    /// Clear the slot of `id` and of every node below it. The caller is
    /// responsible for detaching `id` from its parent first.
    pub(crate) fn clear_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                pending.extend(node.content);
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentSettings::default())
    }
}

/// Iterator over the ancestors of a node.
pub struct AncestorIterator<'a> {
    document: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.document.parent(id);
        Some(id)
    }
}
