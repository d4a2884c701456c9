//! Tree and attribute mutation.

use std::convert::Infallible;
use std::str::FromStr;

use crate::NodeId;
use crate::attributes::{AttrValue, Attribute};
use crate::document::{Document, DomError};
use crate::node::{Node, NodeKind};

/// A readable/writable property of a node: one of the virtual markup
/// properties, or a real attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// `outertext`: the node's full markup.
    OuterHtml,
    /// `innertext`: the node's content markup.
    InnerHtml,
    /// `plaintext`: the node's text content.
    PlainText,
    /// `xmltext`: content markup without CDATA markers.
    XmlText,
    /// Any other name: an attribute.
    Attribute(String),
}

impl From<&str> for Accessor {
    fn from(name: &str) -> Self {
        match name {
            "outertext" => Self::OuterHtml,
            "innertext" => Self::InnerHtml,
            "plaintext" => Self::PlainText,
            "xmltext" => Self::XmlText,
            other => Self::Attribute(other.to_string()),
        }
    }
}

impl FromStr for Accessor {
    type Err = Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(name))
    }
}

impl Document {
    /// An attribute value; `None` when absent or the node is gone.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        self.get(id)?.attrs.get(name)
    }

    /// Returns `true` if the node carries the attribute.
    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.get(id).is_some_and(|node| node.attrs.contains(name))
    }

    /// Set an attribute. A new attribute is written as ` name="value"`;
    /// an existing one keeps its position, spacing and quotes.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] if the node does not exist.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<AttrValue>) -> Result<(), DomError> {
        self.try_get_mut(id)?.attrs.set(name, value.into());
        Ok(())
    }

    /// Remove an attribute, returning it if it was set.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] if the node does not exist.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<Attribute>, DomError> {
        Ok(self.try_get_mut(id)?.attrs.remove(name))
    }

    /// Class tokens of a node, in order.
    #[must_use]
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|value| value.as_str().split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `class` is one of the node's class tokens.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    /// Add each whitespace-separated token of `class` that is not present yet.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] if the node does not exist.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let mut value = self
            .attr(id, "class")
            .map(|v| v.as_str().to_string())
            .unwrap_or_default();
        let _ = self.try_get(id)?;
        for token in class.split_whitespace() {
            if value.split_whitespace().any(|existing| existing == token) {
                continue;
            }
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(token);
        }
        if !value.is_empty() {
            self.set_attr(id, "class", value)?;
        }
        Ok(())
    }

    /// Remove each whitespace-separated token of `class`. The attribute is
    /// dropped once no token is left.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] if the node does not exist.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let node = self.try_get_mut(id)?;
        let Some(current) = node.attrs.get("class") else {
            return Ok(());
        };
        let kept: Vec<&str> = current
            .as_str()
            .split_whitespace()
            .filter(|token| !class.split_whitespace().any(|removed| removed == *token))
            .collect();
        if kept.is_empty() {
            let _ = node.attrs.remove("class");
        } else {
            let joined = kept.join(" ");
            node.attrs.set("class", joined.into());
        }
        Ok(())
    }

    /// Create an unattached element that serializes with an end tag.
    /// The tag name follows the document's case policy.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = if self.settings().lowercase {
            tag.to_ascii_lowercase()
        } else {
            tag.to_string()
        };
        let id = self.alloc(Node::element(tag));
        self.set_end(id, Some(id.0 + 1));
        id
    }

    /// Create an unattached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    /// Move `child` to the end of `parent`'s content.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] for a dead handle, [`DomError::Root`] when
    /// `child` is the root, [`DomError::Cycle`] when `parent` lies inside
    /// `child`'s subtree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let _ = self.try_get(parent)?;
        let _ = self.try_get(child)?;
        if child == NodeId::ROOT {
            return Err(DomError::Root);
        }
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(DomError::Cycle { parent, child });
        }
        self.detach(child);
        self.push_child(parent, child);
        Ok(())
    }

    /// Remove a node and its whole subtree from the document.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] for a dead handle, [`DomError::Root`] for the root.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let _ = self.try_get(id)?;
        if id == NodeId::ROOT {
            return Err(DomError::Root);
        }
        self.detach(id);
        self.clear_subtree(id);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.content.retain(|&c| c != id);
            parent_node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Replace a node's content markup. Text-like nodes get new raw text;
    /// elements get an inner override that hides their children.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] if the node does not exist.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        let node = self.try_get_mut(id)?;
        if node.raw_text.is_some() {
            node.raw_text = Some(html.to_string());
        } else {
            node.inner_override = Some(html.to_string());
        }
        Ok(())
    }

    /// Replace a node's whole markup.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] if the node does not exist.
    pub fn set_outer_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        self.try_get_mut(id)?.outer_override = Some(html.to_string());
        Ok(())
    }

    /// Read a property. Bare attributes read as the empty string.
    #[must_use]
    pub fn get_property(&self, id: NodeId, accessor: &Accessor) -> Option<String> {
        let _ = self.get(id)?;
        match accessor {
            Accessor::OuterHtml => Some(self.outer_html(id)),
            Accessor::InnerHtml => Some(self.inner_html(id)),
            Accessor::PlainText => Some(self.text_content(id)),
            Accessor::XmlText => Some(self.xml_text(id)),
            Accessor::Attribute(name) => self
                .attr(id, name)
                .map(|v| self.restore(v.as_str()).into_owned()),
        }
    }

    /// Write a property. `PlainText` and `XmlText` replace the content like `InnerHtml`.
    ///
    /// # Errors
    ///
    /// [`DomError::Missing`] if the node does not exist.
    pub fn set_property(&mut self, id: NodeId, accessor: &Accessor, value: &str) -> Result<(), DomError> {
        match accessor {
            Accessor::OuterHtml => self.set_outer_html(id, value),
            Accessor::InnerHtml | Accessor::PlainText | Accessor::XmlText => {
                self.set_inner_html(id, value)
            }
            Accessor::Attribute(name) => self.set_attr(id, name, value),
        }
    }

    /// Returns `true` if the node is a live text fragment.
    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Text)
    }
}
