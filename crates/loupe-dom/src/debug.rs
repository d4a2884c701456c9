//! Human-readable tree dump.

use std::fmt::Write;

use crate::NodeId;
use crate::document::Document;
use crate::node::NodeKind;

const PREVIEW_CHARS: usize = 40;

impl Document {
    /// Render the tree, one node per line, indented by depth.
    ///
    /// ```text
    /// #0 root [1..5]
    ///   #1 <ul> [2..5]
    ///     #2 <li class="a"> [3..-]
    ///       #3 text "one"
    /// ```
    #[must_use]
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            out.push_str(&"  ".repeat(depth));
            let _ = write!(out, "{id} ");
            match node.kind() {
                NodeKind::Root => out.push_str("root"),
                NodeKind::Element => {
                    out.push('<');
                    out.push_str(node.tag());
                    for attr in node.attributes() {
                        let _ = write!(out, " {}", attr.name);
                        if !attr.value.is_present_only() {
                            let _ = write!(out, "={:?}", attr.value.as_str());
                        }
                    }
                    out.push('>');
                }
                kind => {
                    let raw = node.raw_text().unwrap_or_default();
                    let text = self.restore(raw);
                    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
                    let ellipsis = if text.chars().count() > PREVIEW_CHARS { "..." } else { "" };
                    let _ = write!(out, "{kind} {preview:?}{ellipsis}");
                }
            }
            if node.kind().is_structural() {
                if node.end().is_some() || node.kind() == NodeKind::Root {
                    let range = self.descendant_range(id);
                    let _ = write!(out, " [{}..{}]", range.start, range.end);
                } else {
                    let _ = write!(out, " [{}..-]", node.begin() + 1);
                }
            }
            out.push('\n');
            stack.extend(node.content().iter().rev().map(|&child| (child, depth + 1)));
        }
        out
    }
}
