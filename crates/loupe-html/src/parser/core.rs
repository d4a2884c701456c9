//! The tolerant tree builder.
//!
//! There is no grammar to violate: text runs up to the next `<`, each `<`
//! starts one tag read, and every construct that cannot be read as a tag
//! becomes literal text. Misnesting is repaired with a small set of
//! implicit-close rules driven by the tables in [`super::tags`].
//!
//! Unmodified input reserializes byte-for-byte: recovered fragments keep
//! their exact source text and start tags record every bit of whitespace.

use loupe_common::warning::warn_once;
use loupe_dom::{
    AttrSpacing, AttrValue, Attribute, Document, IssueKind, Node, NodeId, NodeKind, QuoteStyle,
};

use super::noise::extract_noise;
use super::tags;
use crate::ParseOptions;
use crate::tokenizer::Cursor;
use crate::tokenizer::helpers::{
    TOKEN_ANGLE, TOKEN_ATTR, TOKEN_BLANK, TOKEN_EQUAL, TOKEN_SLASH, TRIM_CHARS,
    is_valid_tag_name, strip_line_breaks,
};

/// Builds a [`Document`] from one input buffer.
pub struct HTMLParser {
    cursor: Cursor,
    document: Document,
    /// Innermost element still open. Everything read is appended here.
    parent: NodeId,
    force_tags_closed: bool,
    lowercase: bool,
}

impl HTMLParser {
    /// Prepare `input` for parsing: normalize newlines if asked and move
    /// opaque regions into the document's noise vault.
    #[must_use]
    pub fn new(input: &str, options: &ParseOptions) -> Self {
        let mut document = Document::new(options.document_settings());
        let mut buffer = if options.normalize_newlines {
            input.replace(['\r', '\n'], " ")
        } else {
            input.to_string()
        };
        let _ = extract_noise(
            document.noise_mut(),
            &mut buffer,
            options.strip_template_directives,
        );
        Self {
            cursor: Cursor::new(buffer),
            document,
            parent: NodeId::ROOT,
            force_tags_closed: options.force_tags_closed,
            lowercase: options.lowercase,
        }
    }

    /// Run the tree builder to the end of input.
    #[must_use]
    pub fn run(mut self) -> Document {
        loop {
            let text = self.cursor.copy_until_char(b'<');
            if !text.is_empty() {
                self.append_text(text);
            } else if !self.read_tag() {
                break;
            }
        }
        let end = self.document.len();
        self.document.set_end(NodeId::ROOT, Some(end));
        self.document
    }

    fn recover(&mut self, kind: IssueKind, offset: usize, message: String) {
        warn_once("HTML Parser", &format!("recovered from {kind} markup"));
        self.document.record_issue(kind, offset, message);
    }

    fn append_text(&mut self, raw: String) {
        let id = self.document.alloc(Node::text(raw));
        self.document.push_child(self.parent, id);
    }

    fn tag_lower(&self, id: NodeId) -> String {
        self.document
            .tag(id)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }

    fn parent_of(&self, id: NodeId) -> NodeId {
        self.document.parent(id).unwrap_or(NodeId::ROOT)
    }

    /// Close the current parent with the end tag read from `begin` and pop it.
    fn close_current(&mut self, begin: usize) {
        let end = self.document.len();
        let raw = self.cursor.since(begin);
        let parent = self.parent;
        if let Some(node) = self.document.get_mut(parent)
            && raw != format!("</{}>", node.tag())
        {
            node.set_close_markup(Some(raw.to_string()));
        }
        self.document.set_end(parent, Some(end));
        self.parent = self.parent_of(parent);
    }

    /// Read one tag at `<`. Returns `false` when no `<` is left.
    fn read_tag(&mut self) -> bool {
        if !self.cursor.at(b'<') {
            return false;
        }
        let begin = self.cursor.pos();
        self.cursor.advance();
        if self.cursor.at(b'/') {
            self.read_end_tag(begin);
        } else {
            self.read_start_tag(begin);
        }
        true
    }

    // =========================================================================
    // End tags
    // =========================================================================

    fn read_end_tag(&mut self, begin: usize) {
        self.cursor.advance();
        self.cursor.skip(TOKEN_BLANK);
        let raw_name = self.cursor.copy_until_char(b'>');
        if self.cursor.is_eof() {
            let raw = self.cursor.since(begin).to_string();
            self.recover(
                IssueKind::UnterminatedTag,
                begin,
                format!("{raw:?} runs to the end of input; kept as text"),
            );
            self.append_text(raw);
            return;
        }
        self.cursor.advance();

        // Attributes on end tags are ignored.
        let name = raw_name
            .split([' ', '\t', '\r', '\n'])
            .next()
            .unwrap_or_default();
        let closing = name.to_ascii_lowercase();
        let parent_tag = self.tag_lower(self.parent);

        if self.parent != NodeId::ROOT && parent_tag == closing {
            self.close_current(begin);
            return;
        }
        if !self.force_tags_closed {
            self.literal_end_tag(begin);
            return;
        }

        let has_grandparent = self.parent != NodeId::ROOT;
        let optional_parent = tags::has_optional_close(&parent_tag);
        let is_block = tags::is_block(&closing);

        if is_block && (optional_parent || has_grandparent) {
            match self.find_open(&closing) {
                Some(ancestor) => {
                    while self.parent != ancestor && self.parent != NodeId::ROOT {
                        self.implicit_close(begin);
                    }
                    self.close_current(begin);
                }
                None => {
                    if optional_parent {
                        self.implicit_close(begin);
                    }
                    self.literal_end_tag(begin);
                }
            }
            return;
        }

        let grandparent = self.parent_of(self.parent);
        if has_grandparent && grandparent != NodeId::ROOT && self.tag_lower(grandparent) == closing {
            self.implicit_close(begin);
            self.close_current(begin);
            return;
        }

        self.literal_end_tag(begin);
    }

    /// Nearest open element (excluding the root) named `tag`.
    fn find_open(&self, tag: &str) -> Option<NodeId> {
        std::iter::once(self.parent)
            .chain(self.document.ancestors(self.parent))
            .take_while(|&id| id != NodeId::ROOT)
            .find(|&id| self.tag_lower(id) == tag)
    }

    /// Pop the current parent without an end tag.
    fn implicit_close(&mut self, offset: usize) {
        let tag = self.tag_lower(self.parent);
        self.recover(
            IssueKind::ImplicitClose,
            offset,
            format!("<{tag}> closed without its end tag"),
        );
        self.document.set_end(self.parent, None);
        self.parent = self.parent_of(self.parent);
    }

    fn literal_end_tag(&mut self, begin: usize) {
        let raw = self.cursor.since(begin).to_string();
        self.recover(
            IssueKind::UnmatchedEndTag,
            begin,
            format!("{raw} has no open element to close; kept as text"),
        );
        self.append_text(raw);
    }

    // =========================================================================
    // Start tags
    // =========================================================================

    fn read_start_tag(&mut self, begin: usize) {
        let tag = self.cursor.copy_until(TOKEN_SLASH);

        if let Some(rest) = tag.strip_prefix('!') {
            let _ = self.cursor.copy_until_char(b'>');
            self.cursor.advance();
            let raw = self.cursor.since(begin).to_string();
            let kind = if rest.starts_with("--") {
                NodeKind::Comment
            } else {
                NodeKind::Unknown
            };
            let id = self.document.alloc(Node::leaf(kind, raw));
            self.document.push_child(self.parent, id);
            return;
        }

        if let Some(offset) = tag.find('<') {
            let stop = begin + 1 + offset;
            self.cursor.seek(stop);
            let raw = self.cursor.slice(begin..stop).to_string();
            self.recover(
                IssueKind::StrayLessThan,
                begin,
                format!("{raw:?} is followed by another '<'; kept as text"),
            );
            self.append_text(raw);
            return;
        }

        if !is_valid_tag_name(&tag) {
            let _ = self.cursor.copy_until(TOKEN_ANGLE);
            if self.cursor.at(b'>') {
                self.cursor.advance();
            }
            let raw = self.cursor.since(begin).to_string();
            self.recover(
                IssueKind::InvalidTagName,
                begin,
                format!("{tag:?} is not a tag name; kept as text"),
            );
            self.append_text(raw);
            return;
        }

        let lower = tag.to_ascii_lowercase();
        if self.force_tags_closed && tags::has_optional_close(&lower) {
            while self.parent != NodeId::ROOT
                && tags::closes_implicitly(&lower, &self.tag_lower(self.parent))
            {
                self.implicit_close(begin);
            }
        }

        let name = if self.lowercase { lower.clone() } else { tag };
        let mut node = Node::element(name);
        let Some(end_space) = self.read_attributes(begin, &mut node) else {
            return;
        };

        let tail = self.cursor.copy_until_char(b'>');
        if self.cursor.is_eof() {
            let raw = self.cursor.since(begin).to_string();
            self.abort_as_text(node, raw, IssueKind::UnterminatedTag, begin);
            return;
        }
        self.cursor.advance();

        let self_closed = tail == "/";
        node.set_end_space(end_space + &tail);
        let is_br = node.tag() == "br";
        if is_br {
            node.set_inner_override(Some(self.document.settings().br_text.clone()));
        }

        let id = self.document.alloc(node);
        self.document.push_child(self.parent, id);
        if !self_closed && !tags::is_void(&lower) {
            self.parent = id;
        }
    }

    /// Read attributes into `node`. Returns the markup after the last kept
    /// attribute, or `None` if the tag was abandoned and emitted as text.
    fn read_attributes(&mut self, begin: usize, node: &mut Node) -> Option<String> {
        let mut space = self.cursor.copy_skip(TOKEN_BLANK);
        let mut carried = String::new();
        let mut guard = None;

        loop {
            let raw_name = self.cursor.copy_until(TOKEN_EQUAL);
            if raw_name.is_empty() && !self.cursor.is_eof() && space.is_empty() {
                break;
            }
            let name_end = self.cursor.pos();

            if guard == Some(name_end) {
                self.cursor.advance();
                if self.at_tag_close() {
                    break;
                }
                continue;
            }
            guard = Some(name_end);

            let len = self.cursor.input().len();
            if name_end + 1 >= len && !self.cursor.at(b'>') {
                self.cursor.seek(len);
                let raw = self.cursor.slice(begin..len).to_string();
                self.abort_as_text(node.clone(), raw, IssueKind::UnterminatedTag, begin);
                return None;
            }

            if self.cursor.previous() == Some(b'<') {
                let stop = name_end - 1;
                let raw = self.cursor.slice(begin..stop).to_string();
                self.cursor.seek(stop);
                self.abort_as_text(node.clone(), raw, IssueKind::MisplacedAttribute, begin);
                return None;
            }

            if raw_name.is_empty() || raw_name == "/" {
                break;
            }

            let before_name = std::mem::take(&mut carried) + &space;
            let attr = self.read_attribute(&raw_name, name_end, before_name);
            if node.attributes().contains(&attr.name) {
                // Only the first of a repeated name counts; the rest stay as markup.
                attr.write_to(&mut carried);
            } else {
                let _ = node.attributes_mut().push(attr);
            }

            space = self.cursor.copy_skip(TOKEN_BLANK);
            if self.at_tag_close() {
                break;
            }
        }
        Some(carried + &space)
    }

    fn at_tag_close(&self) -> bool {
        self.cursor.at(b'>') || self.cursor.at(b'/')
    }

    fn read_attribute(&mut self, raw_name: &str, name_end: usize, before_name: String) -> Attribute {
        let before_equals = self.cursor.copy_skip(TOKEN_BLANK);
        let restored = self.document.restore(raw_name);
        let name = if self.lowercase {
            restored.to_ascii_lowercase()
        } else {
            restored.into_owned()
        };

        if !self.cursor.at(b'=') {
            // Bare attribute: the whitespace after it belongs to the next one.
            self.cursor.seek(name_end);
            return Attribute {
                name,
                value: AttrValue::Present,
                quote: QuoteStyle::None,
                spacing: AttrSpacing {
                    before_name,
                    ..AttrSpacing::default()
                },
                source: None,
            };
        }

        self.cursor.advance();
        let after_equals = self.cursor.copy_skip(TOKEN_BLANK);
        let (raw_value, quote) = match self.cursor.current() {
            Some(quote @ (b'"' | b'\'')) => {
                self.cursor.advance();
                let value = self.cursor.copy_until_char(quote);
                self.cursor.advance();
                let style = if quote == b'"' {
                    QuoteStyle::Double
                } else {
                    QuoteStyle::Single
                };
                (value, style)
            }
            _ => (self.cursor.copy_until(TOKEN_ATTR), QuoteStyle::None),
        };

        let mut value = strip_line_breaks(&self.document.restore(&raw_value));
        if name == "class" {
            value = value.trim_matches(TRIM_CHARS).to_string();
        }
        let source = (value != raw_value).then_some(raw_value);
        Attribute {
            name,
            value: AttrValue::Text(value),
            quote,
            spacing: AttrSpacing {
                before_name,
                before_equals,
                after_equals,
            },
            source,
        }
    }

    fn abort_as_text(&mut self, mut node: Node, raw: String, kind: IssueKind, begin: usize) {
        self.recover(
            kind,
            begin,
            format!("<{}> could not be read as a tag; kept as text", node.tag()),
        );
        node.retype_as_text(raw);
        let id = self.document.alloc(node);
        self.document.push_child(self.parent, id);
    }
}
