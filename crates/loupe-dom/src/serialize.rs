//! Markup and plain-text serialization.
//!
//! All walks use explicit stacks; documents from the wild can nest far
//! deeper than the call stack allows.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::NodeId;
use crate::document::Document;
use crate::node::NodeKind;

/// Called once per visited non-root node; a returned string replaces the
/// node's whole markup.
type Visitor<'v> = dyn FnMut(&Document, NodeId) -> Option<String> + 'v;

enum Step<'a> {
    Outer(NodeId),
    Inner(NodeId),
    Literal(&'a str),
    Close(&'a str),
}

struct TextFrame<'a> {
    buf: String,
    content: &'a [NodeId],
    next: usize,
}

/// CDATA open and close markers; the payload between them is kept.
static CDATA_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!\[CDATA\[|\]\]>").expect("CDATA_MARKER_RE: hardcoded regex is valid")
});

/// Whitespace stripped before a paragraph break.
const TRIM_SET: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

impl Document {
    /// The node's full markup: start tag, content and end tag.
    ///
    /// For the root this is the whole document. Unmodified nodes reproduce
    /// their source bytes exactly.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write(Step::Outer(id), &mut out, None);
        out
    }

    /// Like [`Document::outer_html`], letting `visitor` replace the markup
    /// of any node it is called for.
    pub fn outer_html_with<F>(&self, id: NodeId, mut visitor: F) -> String
    where
        F: FnMut(&Self, NodeId) -> Option<String>,
    {
        let mut out = String::new();
        let visitor: &mut Visitor<'_> = &mut visitor;
        self.write(Step::Outer(id), &mut out, Some(visitor));
        out
    }

    /// The node's content markup, without its own tags.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write(Step::Inner(id), &mut out, None);
        out
    }

    /// Content markup with `<![CDATA[` and `]]>` markers dropped.
    #[must_use]
    pub fn xml_text(&self, id: NodeId) -> String {
        CDATA_MARKER_RE.replace_all(&self.inner_html(id), "").into_owned()
    }

    /// The whole document as markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.outer_html(NodeId::ROOT)
    }

    /// Write the whole document to `path`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from writing the file.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_html())
    }

    fn write<'a>(&'a self, first: Step<'a>, out: &mut String, mut visitor: Option<&mut Visitor<'_>>) {
        let mut stack = vec![first];
        while let Some(step) = stack.pop() {
            match step {
                Step::Literal(text) => out.push_str(text),
                Step::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                Step::Inner(id) => self.push_inner(id, out, &mut stack),
                Step::Outer(id) => {
                    let Some(node) = self.get(id) else {
                        continue;
                    };
                    if node.kind == NodeKind::Root {
                        stack.push(Step::Inner(id));
                        continue;
                    }
                    if let Some(replacement) = visitor.as_mut().and_then(|visit| visit(self, id)) {
                        out.push_str(&replacement);
                        continue;
                    }
                    if let Some(outer) = node.outer_override.as_deref() {
                        out.push_str(outer);
                        continue;
                    }
                    if let Some(raw) = node.raw_text.as_deref() {
                        self.noise().restore_into(raw, out);
                        continue;
                    }

                    let mut open = String::with_capacity(node.tag.len() + 2);
                    open.push('<');
                    open.push_str(&node.tag);
                    for attr in &node.attrs {
                        attr.write_to(&mut open);
                    }
                    open.push_str(&node.end_space);
                    open.push('>');
                    self.noise().restore_into(&open, out);

                    if node.end.is_some() {
                        stack.push(match node.close_markup.as_deref() {
                            Some(markup) => Step::Literal(markup),
                            None => Step::Close(&node.tag),
                        });
                    }
                    match node.inner_override.as_deref() {
                        Some(_) if node.tag == "br" => {}
                        Some(inner) => stack.push(Step::Literal(inner)),
                        None => stack.extend(node.content.iter().rev().map(|&c| Step::Outer(c))),
                    }
                }
            }
        }
    }

    fn push_inner<'a>(&'a self, id: NodeId, out: &mut String, stack: &mut Vec<Step<'a>>) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let Some(inner) = node.inner_override.as_deref() {
            out.push_str(inner);
        } else if let Some(raw) = node.raw_text.as_deref() {
            self.noise().restore_into(raw, out);
        } else {
            stack.extend(node.content.iter().rev().map(|&c| Step::Outer(c)));
        }
    }

    /// Plain text of a node.
    ///
    /// Comments, unknown constructs, `script` and `style` contribute
    /// nothing. A `p` trims the text gathered so far and starts after a
    /// blank line; each `span` is followed by the document's span text.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(leaf) = self.leaf_text(id) {
            return leaf.into_owned();
        }
        let mut frames = vec![TextFrame {
            buf: String::new(),
            content: self.content(id),
            next: 0,
        }];
        let span_text = self.settings().span_text.as_str();

        while let Some(frame) = frames.last_mut() {
            let Some(&child) = frame.content.get(frame.next) else {
                let Some(done) = frames.pop() else {
                    break;
                };
                let Some(parent) = frames.last_mut() else {
                    return done.buf;
                };
                parent.buf.push_str(&done.buf);
                if self.tag(parent.content[parent.next - 1]) == Some("span") {
                    parent.buf.push_str(span_text);
                }
                continue;
            };
            frame.next += 1;
            let tag = self.tag(child);
            if tag == Some("p") {
                frame.buf = frame.buf.trim_matches(TRIM_SET).to_string();
                frame.buf.push_str("\n\n");
            }
            match self.leaf_text(child) {
                Some(text) => {
                    frame.buf.push_str(&text);
                    if tag == Some("span") {
                        frame.buf.push_str(span_text);
                    }
                }
                None => frames.push(TextFrame {
                    buf: String::new(),
                    content: self.content(child),
                    next: 0,
                }),
            }
        }
        String::new()
    }

    /// Text of nodes that need no descent; `None` for elements to walk.
    fn leaf_text(&self, id: NodeId) -> Option<Cow<'_, str>> {
        let Some(node) = self.get(id) else {
            return Some(Cow::Borrowed(""));
        };
        if let Some(inner) = node.inner_override.as_deref() {
            return Some(Cow::Borrowed(inner));
        }
        match node.kind {
            NodeKind::Text => Some(self.restore(node.raw_text.as_deref().unwrap_or_default())),
            NodeKind::Comment | NodeKind::Unknown => Some(Cow::Borrowed("")),
            NodeKind::Element
                if node.tag.eq_ignore_ascii_case("script") || node.tag.eq_ignore_ascii_case("style") =>
            {
                Some(Cow::Borrowed(""))
            }
            NodeKind::Element | NodeKind::Root => {
                if let Some(raw) = node.raw_text.as_deref() {
                    return Some(self.restore(raw));
                }
                None
            }
        }
    }
}
