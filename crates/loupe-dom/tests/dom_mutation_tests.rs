//! Tests for the node table: serialization, navigation and mutation.

use loupe_dom::{
    Accessor, AttrValue, Attribute, Document, DomError, NOISE_PREFIX, Node, NodeId, NodeKind,
    NoiseVault, QuoteStyle,
};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use regex::Regex;

/// Allocate an element under `parent`. Call [`close`] once its content is built.
fn element(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let id = doc.alloc(Node::element(tag));
    doc.push_child(parent, id);
    id
}

/// Record an explicit end tag for `id` at the current table length.
fn close(doc: &mut Document, id: NodeId) {
    let end = doc.len();
    doc.set_end(id, Some(end));
}

fn text(doc: &mut Document, parent: NodeId, raw: &str) -> NodeId {
    let id = doc.alloc(Node::text(raw));
    doc.push_child(parent, id);
    id
}

/// `<div id="x"><p>one</p>mid<p>two</p></div>`
fn sample() -> (Document, NodeId, NodeId, NodeId) {
    let mut doc = Document::default();
    let div = element(&mut doc, NodeId::ROOT, "div");
    let _ = doc
        .get_mut(div)
        .map(|node| node.attributes_mut().push(Attribute::new("id", "x".into())));
    let first = element(&mut doc, div, "p");
    let _ = text(&mut doc, first, "one");
    close(&mut doc, first);
    let _ = text(&mut doc, div, "mid");
    let second = element(&mut doc, div, "p");
    let _ = text(&mut doc, second, "two");
    close(&mut doc, second);
    close(&mut doc, div);
    close(&mut doc, NodeId::ROOT);
    (doc, div, first, second)
}

// ========== serialization ==========

#[test]
fn test_outer_and_inner_html() {
    let (doc, div, first, _) = sample();
    assert_eq!(doc.to_html(), r#"<div id="x"><p>one</p>mid<p>two</p></div>"#);
    assert_eq!(doc.inner_html(div), "<p>one</p>mid<p>two</p>");
    assert_eq!(doc.outer_html(first), "<p>one</p>");
}

#[test]
fn test_element_without_end_has_no_close_tag() {
    let mut doc = Document::default();
    let img = element(&mut doc, NodeId::ROOT, "img");
    if let Some(node) = doc.get_mut(img) {
        node.set_end_space(" /");
    }
    assert_eq!(doc.to_html(), "<img />");
}

#[test]
fn test_br_override_is_not_serialized() {
    let mut doc = Document::default();
    let br = element(&mut doc, NodeId::ROOT, "br");
    if let Some(node) = doc.get_mut(br) {
        node.set_inner_override(Some("\r\n".to_string()));
    }
    assert_eq!(doc.to_html(), "<br>");
    assert_eq!(doc.text_content(br), "\r\n");
}

#[test]
fn test_text_content_paragraphs_and_spans() {
    let mut doc = Document::default();
    let div = element(&mut doc, NodeId::ROOT, "div");
    let _ = text(&mut doc, div, "a ");
    let p = element(&mut doc, div, "p");
    let _ = text(&mut doc, p, "b");
    close(&mut doc, p);
    let span = element(&mut doc, div, "span");
    let _ = text(&mut doc, span, "c");
    close(&mut doc, span);
    let _ = text(&mut doc, div, "d");
    close(&mut doc, div);

    assert_eq!(doc.text_content(div), "a\n\nbc d");
}

#[test]
fn test_text_content_skips_scripts_and_comments() {
    let mut doc = Document::default();
    let div = element(&mut doc, NodeId::ROOT, "div");
    let script = element(&mut doc, div, "script");
    let _ = text(&mut doc, script, "var x;");
    close(&mut doc, script);
    let comment = doc.alloc(Node::leaf(NodeKind::Comment, "<!-- hidden -->"));
    doc.push_child(div, comment);
    let _ = text(&mut doc, div, "shown");
    close(&mut doc, div);

    assert_eq!(doc.text_content(div), "shown");
    assert_eq!(doc.children(div), &[script, comment]);
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let mut doc = Document::default();
    let mut parent = NodeId::ROOT;
    for _ in 0..50_000 {
        parent = element(&mut doc, parent, "div");
    }
    let _ = text(&mut doc, parent, "leaf");
    let html = doc.to_html();
    assert!(html.starts_with("<div><div>"));
    assert!(html.ends_with("leaf"));
    assert_eq!(doc.text_content(NodeId::ROOT), "leaf");
    assert!(doc.dump_tree().lines().count() > 50_000);
}

#[test]
fn test_dump_tree_shows_ranges() {
    let (doc, _, _, _) = sample();
    assert_eq!(
        doc.dump_tree(),
        "#0 root [1..7]\n  #1 <div id=\"x\"> [2..7]\n    #2 <p> [3..4]\n      #3 text \"one\"\n    \
         #4 text \"mid\"\n    #5 <p> [6..7]\n      #6 text \"two\"\n"
    );
}

#[test]
fn test_visitor_replaces_markup() {
    let (doc, _, first, _) = sample();
    let html = doc.outer_html_with(NodeId::ROOT, |doc, id| {
        (id == first).then(|| format!("[{}]", doc.text_content(id)))
    });
    assert_eq!(html, r#"<div id="x">[one]mid<p>two</p></div>"#);
}

#[test]
fn test_noise_is_restored_on_output() {
    let mut doc = Document::default();
    let mut buffer = "<!--secret-->".to_string();
    let pattern = Regex::new(r"(?s)<!--(.*?)-->").unwrap();
    assert_eq!(doc.noise_mut().extract(&mut buffer, &pattern, false), 1);
    let comment = doc.alloc(Node::leaf(NodeKind::Comment, buffer.clone()));
    doc.push_child(NodeId::ROOT, comment);

    assert!(doc.get(comment).unwrap().raw_text().unwrap().contains(NOISE_PREFIX));
    assert_eq!(doc.to_html(), "<!--secret-->");
    assert_eq!(doc.text_content(NodeId::ROOT), "");
}

// ========== navigation ==========

#[test]
fn test_structural_navigation_skips_text() {
    let (doc, div, first, second) = sample();
    assert_eq!(doc.content(div).len(), 3);
    assert_eq!(doc.children(div), &[first, second]);
    assert_eq!(doc.first_child(div), Some(first));
    assert_eq!(doc.last_child(div), Some(second));
    assert_eq!(doc.child(div, -1), Some(second));
    assert_eq!(doc.child(div, 2), None);
    assert_eq!(doc.child(div, -3), None);
    assert_eq!(doc.next_sibling(first), Some(second));
    assert_eq!(doc.prev_sibling(second), Some(first));
    assert_eq!(doc.prev_sibling(first), None);
    assert!(doc.has_child(div));
    assert!(!doc.has_child(second));
}

#[test]
fn test_ancestors_and_ranges() {
    let (doc, div, first, second) = sample();
    assert_eq!(doc.ancestors(first).collect::<Vec<_>>(), vec![div, NodeId::ROOT]);
    assert_eq!(doc.find_ancestor_tag(first, "DIV"), Some(div));
    assert_eq!(doc.find_ancestor_tag(first, "p"), None);
    assert_eq!(doc.descendant_range(NodeId::ROOT), 1..doc.len());
    assert_eq!(doc.descendant_range(div), 2..7);
    assert_eq!(doc.same_tag_position(second), Some(1));
}

#[test]
fn test_missing_end_borrows_ancestor_end() {
    let mut doc = Document::default();
    let ul = element(&mut doc, NodeId::ROOT, "ul");
    let li = element(&mut doc, ul, "li");
    let _ = text(&mut doc, li, "a");
    let next = element(&mut doc, ul, "li");
    close(&mut doc, ul);
    assert_eq!(doc.get(li).and_then(Node::end), None);
    assert_eq!(doc.descendant_range(li), 3..doc.len());
    assert_eq!(doc.descendant_range(next), 5..doc.len());
}

// ========== attributes and classes ==========

#[test]
fn test_set_attr_formats_new_attributes() {
    let (mut doc, div, _, _) = sample();
    doc.set_attr(div, "title", "hello").unwrap();
    doc.set_attr(div, "hidden", AttrValue::Present).unwrap();
    assert!(doc.to_html().starts_with(r#"<div id="x" title="hello" hidden>"#));
    assert_eq!(doc.attr(div, "hidden").map(AttrValue::as_str), Some(""));
}

#[test]
fn test_set_attr_keeps_existing_quotes() {
    let mut doc = Document::default();
    let a = element(&mut doc, NodeId::ROOT, "a");
    let mut href = Attribute::new("href", "x".into());
    href.quote = QuoteStyle::Single;
    let _ = doc.get_mut(a).map(|node| node.attributes_mut().push(href));
    close(&mut doc, a);
    doc.set_attr(a, "href", "y").unwrap();
    assert_eq!(doc.to_html(), "<a href='y'></a>");
}

#[test]
fn test_remove_attr() {
    let (mut doc, div, _, _) = sample();
    let removed = doc.remove_attr(div, "id").unwrap();
    assert_eq!(removed.map(|attr| attr.name), Some("id".to_string()));
    assert!(!doc.has_attr(div, "id"));
    assert_eq!(doc.remove_attr(div, "id"), Ok(None));
    assert!(doc.to_html().starts_with("<div>"));
}

#[test]
fn test_class_token_set() {
    let (mut doc, div, _, _) = sample();
    doc.add_class(div, "a b").unwrap();
    doc.add_class(div, "b c").unwrap();
    assert_eq!(doc.classes(div), vec!["a", "b", "c"]);
    assert!(doc.has_class(div, "b"));

    doc.remove_class(div, "a c").unwrap();
    assert_eq!(doc.attr(div, "class").map(AttrValue::as_str), Some("b"));
    doc.remove_class(div, "b").unwrap();
    assert!(!doc.has_attr(div, "class"));
}

// ========== tree mutation ==========

#[test]
fn test_append_child_reparents() {
    let (mut doc, div, first, second) = sample();
    doc.append_child(first, second).unwrap();
    assert_eq!(doc.parent(second), Some(first));
    assert_eq!(doc.children(div), &[first]);
    assert_eq!(doc.to_html(), r#"<div id="x"><p>one<p>two</p></p>mid</div>"#);
}

#[test]
fn test_append_text_is_content_only() {
    let (mut doc, div, first, second) = sample();
    let extra = doc.create_text("!");
    doc.append_child(div, extra).unwrap();
    assert_eq!(doc.children(div), &[first, second]);
    assert_eq!(doc.content(div).last(), Some(&extra));
    assert!(doc.is_text(extra));
}

#[test]
fn test_append_child_rejects_cycles_and_root() {
    let (mut doc, div, first, _) = sample();
    assert_eq!(
        doc.append_child(first, div),
        Err(DomError::Cycle { parent: first, child: div })
    );
    assert_eq!(doc.append_child(div, div), Err(DomError::Cycle { parent: div, child: div }));
    assert_eq!(doc.append_child(div, NodeId::ROOT), Err(DomError::Root));
    assert_eq!(doc.append_child(div, NodeId(999)), Err(DomError::Missing(NodeId(999))));
}

#[test]
fn test_remove_clears_subtree() {
    let (mut doc, div, first, second) = sample();
    let live = doc.node_count();
    let len = doc.len();
    let inner_text = doc.content(first)[0];

    doc.remove(first).unwrap();

    assert_eq!(doc.node_count(), live - 2);
    assert_eq!(doc.len(), len);
    assert!(!doc.contains(first));
    assert!(!doc.contains(inner_text));
    assert_eq!(doc.children(div), &[second]);
    assert!(doc.node_ids().all(|id| id != first && id != inner_text));
    assert_eq!(doc.remove(first), Err(DomError::Missing(first)));
    assert_eq!(doc.remove(NodeId::ROOT), Err(DomError::Root));
    assert_eq!(doc.to_html(), r#"<div id="x">mid<p>two</p></div>"#);
}

#[test]
fn test_created_element_closes() {
    let (mut doc, div, _, _) = sample();
    let span = doc.create_element("SPAN");
    let inner = doc.create_text("new");
    doc.append_child(span, inner).unwrap();
    doc.append_child(div, span).unwrap();
    assert!(doc.to_html().ends_with("<span>new</span></div>"));
}

#[test]
fn test_inner_and_outer_overrides() {
    let (mut doc, div, first, second) = sample();
    let mid = doc.content(div)[1];
    doc.set_inner_html(first, "<b>bold</b>").unwrap();
    doc.set_inner_html(mid, " middle ").unwrap();
    doc.set_outer_html(second, "<hr>").unwrap();
    assert_eq!(doc.to_html(), r#"<div id="x"><p><b>bold</b></p> middle <hr></div>"#);
}

#[test]
fn test_accessors() {
    let (mut doc, div, first, _) = sample();
    assert_eq!(Accessor::from("plaintext"), Accessor::PlainText);
    assert_eq!(Accessor::from("href"), Accessor::Attribute("href".to_string()));

    assert_eq!(doc.get_property(first, &Accessor::OuterHtml).as_deref(), Some("<p>one</p>"));
    assert_eq!(doc.get_property(div, &Accessor::PlainText).as_deref(), Some("onemid\n\ntwo"));
    assert_eq!(doc.get_property(div, &"id".into()).as_deref(), Some("x"));
    assert_eq!(doc.get_property(div, &"lang".into()), None);

    doc.set_property(first, &Accessor::InnerHtml, "uno").unwrap();
    doc.set_property(first, &"lang".into(), "es").unwrap();
    assert_eq!(doc.outer_html(first), r#"<p lang="es">uno</p>"#);
}

// ========== noise vault properties ==========

#[quickcheck]
fn prop_extract_then_restore_is_identity(body: String) -> TestResult {
    if body.contains(NOISE_PREFIX) {
        return TestResult::discard();
    }
    let original = format!("<p>{body}</p><!--{body}-->{body}");
    let mut buffer = original.clone();
    let mut vault = NoiseVault::new();
    let pattern = Regex::new(r"(?s)<!--(.*?)-->").unwrap();
    let _ = vault.extract(&mut buffer, &pattern, false);
    TestResult::from_bool(vault.restore(&buffer) == original)
}

#[quickcheck]
fn prop_restore_is_idempotent(text: String) -> bool {
    let mut vault = NoiseVault::new();
    let mut buffer = format!("<!--{text}-->");
    let pattern = Regex::new(r"(?s)<!--(.*?)-->").unwrap();
    let _ = vault.extract(&mut buffer, &pattern, false);
    let once = vault.restore(&buffer).into_owned();
    once.contains(NOISE_PREFIX) || vault.restore(&once) == once
}
