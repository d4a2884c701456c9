//! Node entities stored in a [`Document`](crate::Document)'s table.

use serde::Serialize;
use strum_macros::Display;

use crate::NodeId;
use crate::attributes::Attributes;

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    /// The single document root (handle 0).
    Root,
    /// A start tag with attributes and, usually, content.
    Element,
    /// `<!-- ... -->`
    Comment,
    /// Literal text, including recovered markup that could not be parsed as a tag.
    Text,
    /// Any other `<!...>` construct such as a doctype.
    Unknown,
}

impl NodeKind {
    /// The tag name given to non-element nodes.
    #[must_use]
    pub const fn sentinel_tag(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Element => "",
            Self::Comment => "comment",
            Self::Text => "text",
            Self::Unknown => "unknown",
        }
    }

    /// Structural nodes take part in child and sibling navigation.
    /// Only bare text fragments are excluded.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// A single node.
///
/// `parent`, `content` and `children` hold handles into the owning
/// document's table; the table is the only owner of node storage.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) tag: String,
    pub(crate) attrs: Attributes,
    /// Whitespace (and a possible `/`) between the last attribute and `>`.
    pub(crate) end_space: String,
    pub(crate) begin: usize,
    /// Table length at the moment the explicit close was resolved.
    /// `None` for void, self-closed, implicitly closed or unterminated elements.
    pub(crate) end: Option<usize>,
    /// Source text of the end tag when it is not exactly `</tag>`.
    pub(crate) close_markup: Option<String>,
    pub(crate) raw_text: Option<String>,
    pub(crate) inner_override: Option<String>,
    pub(crate) outer_override: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) content: Vec<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    fn with_kind(kind: NodeKind, tag: String, raw_text: Option<String>) -> Self {
        Self {
            kind,
            tag,
            attrs: Attributes::new(),
            end_space: String::new(),
            begin: 0,
            end: None,
            close_markup: None,
            raw_text,
            inner_override: None,
            outer_override: None,
            parent: None,
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The document root.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind(NodeKind::Root, NodeKind::Root.sentinel_tag().to_string(), None)
    }

    /// An element with the given (already case-normalized) tag name.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Element, tag.into(), None)
    }

    /// A literal text node.
    #[must_use]
    pub fn text(raw: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Text, raw)
    }

    /// A leaf node (text, comment or unknown) holding verbatim markup.
    #[must_use]
    pub fn leaf(kind: NodeKind, raw: impl Into<String>) -> Self {
        Self::with_kind(kind, kind.sentinel_tag().to_string(), Some(raw.into()))
    }

    /// Turn a half-built element into literal text. Used when a start tag
    /// turns out to be malformed after the node was allocated.
    pub fn retype_as_text(&mut self, raw: impl Into<String>) {
        self.kind = NodeKind::Text;
        self.tag = NodeKind::Text.sentinel_tag().to_string();
        self.attrs = Attributes::new();
        self.end_space.clear();
        self.end = None;
        self.close_markup = None;
        self.raw_text = Some(raw.into());
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns `true` for element nodes.
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Tag name, or the sentinel (`root`, `text`, `comment`, `unknown`).
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in source order.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    /// Mutable attribute access for tree builders.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// Whitespace (and `/` for self-closed tags) written before `>`.
    #[must_use]
    pub fn end_space(&self) -> &str {
        &self.end_space
    }

    /// Set the text written between the last attribute and `>`.
    pub fn set_end_space(&mut self, end_space: impl Into<String>) {
        self.end_space = end_space.into();
    }

    /// Table index of this node.
    #[must_use]
    pub const fn begin(&self) -> usize {
        self.begin
    }

    /// Table length at which the explicit close was found, if any.
    #[must_use]
    pub const fn end(&self) -> Option<usize> {
        self.end
    }

    /// End tag as written in the source, if it differed from `</tag>`.
    #[must_use]
    pub fn close_markup(&self) -> Option<&str> {
        self.close_markup.as_deref()
    }

    /// Record how the end tag was written.
    pub fn set_close_markup(&mut self, markup: Option<String>) {
        self.close_markup = markup;
    }

    /// Verbatim payload of text, comment and unknown nodes. May still
    /// contain noise placeholders; use the document's serializers to read it.
    #[must_use]
    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    /// Replacement for this node's content, if set.
    #[must_use]
    pub fn inner_override(&self) -> Option<&str> {
        self.inner_override.as_deref()
    }

    /// Set or clear the content replacement.
    pub fn set_inner_override(&mut self, inner: Option<String>) {
        self.inner_override = inner;
    }

    /// Replacement for this node's whole markup, if set.
    #[must_use]
    pub fn outer_override(&self) -> Option<&str> {
        self.outer_override.as_deref()
    }

    /// Parent handle. `None` for the root and for detached nodes.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Every immediately nested node in document order, text included.
    #[must_use]
    pub fn content(&self) -> &[NodeId] {
        &self.content
    }

    /// Structural subset of [`Node::content`]: no bare text fragments.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
