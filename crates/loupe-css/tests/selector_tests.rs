//! Integration tests for selector compilation and queries.

use loupe_css::{Query, Selector, SelectorError};
use loupe_dom::{Document, NodeId};
use loupe_html::ParseOptions;

fn parse(html: &str) -> Document {
    loupe_html::parse(html, &ParseOptions::default()).expect("input under the size limit")
}

fn parse_keep_case(html: &str) -> Document {
    let options = ParseOptions::default().with_lowercase(false);
    loupe_html::parse(html, &options).expect("input under the size limit")
}

fn ids(raw: &[usize]) -> Vec<NodeId> {
    raw.iter().copied().map(NodeId).collect()
}

/// Plain text of every match, for readable assertions.
fn texts(doc: &Document, found: &[NodeId]) -> Vec<String> {
    found.iter().map(|&id| doc.text_content(id)).collect()
}

const PARAGRAPHS: &str = r#"<div id="x"><p class="a b">1</p><p class="a">2</p></div>"#;

const LIST: &str = r#"<ul><li>a</li><li class="x">b</li><li>c</li><li>d</li></ul>"#;

const LINKS: &str = r##"<a href="https://a">1</a><a href="http://b">2</a><a href="#">3</a><a>4</a>"##;

#[test]
fn test_child_combinator_with_classes() {
    let doc = parse(PARAGRAPHS);
    assert_eq!(doc.find("div > p.a", false), ids(&[2, 4]));
    assert_eq!(doc.find("div > p.a.b", false), ids(&[2]));
    assert_eq!(doc.find("div > p.c", false), ids(&[]));
}

#[test]
fn test_unsupported_pseudo_is_ignored() {
    let doc = parse(PARAGRAPHS);
    assert_eq!(doc.find("#x p:not-supported", false), doc.find("#x p", false));
    assert_eq!(doc.find("#x p", false), ids(&[2, 4]));
    assert_eq!(doc.find("p::first-line", false), ids(&[2, 4]));
}

#[test]
fn test_descendant_combinator() {
    let doc = parse("<div><section><p>deep</p></section></div><p>top</p>");
    assert_eq!(texts(&doc, &doc.find("div p", false)), ["deep"]);
    assert_eq!(texts(&doc, &doc.find("p", false)), ["deep", "top"]);
    assert_eq!(doc.find("section div", false), ids(&[]));
}

#[test]
fn test_descendant_scan_uses_borrowed_end() {
    // The li elements are closed implicitly and borrow the ul's end.
    let doc = parse("<ul><li><b>1</b><li><b>2</b></ul><b>3</b>");
    assert_eq!(texts(&doc, &doc.find("ul b", false)), ["1", "2"]);
    assert_eq!(texts(&doc, &doc.find("b", false)), ["1", "2", "3"]);
}

#[test]
fn test_next_and_subsequent_sibling() {
    let doc = parse(LIST);
    assert_eq!(texts(&doc, &doc.find("li.x + li", false)), ["c"]);
    // The subsequent-sibling step keeps the matched node itself.
    assert_eq!(texts(&doc, &doc.find("li.x ~ li", false)), ["b", "c", "d"]);
    assert_eq!(doc.find("li ~ li", false).len(), 4);
    assert_eq!(doc.find("li:last-child + li", false).len(), 3);
}

#[test]
fn test_sibling_steps_skip_text() {
    let doc = parse("<p>a</p> text <p>b</p>");
    assert_eq!(texts(&doc, &doc.find("p + p", false)), ["b"]);
}

#[test]
fn test_positional_predicate() {
    let doc = parse(LIST);
    assert_eq!(texts(&doc, &doc.find("ul > li[1]", false)), ["b"]);
    assert_eq!(texts(&doc, &doc.find("li[0]", false)), ["a"]);
    assert_eq!(doc.find("li[9]", false), ids(&[]));
}

#[test]
fn test_nth_match() {
    let doc = parse(LIST);
    assert_eq!(doc.find_nth("li", 0, false), Some(NodeId(2)));
    assert_eq!(doc.find_nth("li", -1, false), Some(NodeId(8)));
    assert_eq!(doc.find_nth("li", 4, false), None);
    assert_eq!(doc.find_nth("li", -5, false), None);
}

#[test]
fn test_scoped_queries() {
    let doc = parse(LIST);
    let ul = NodeId(1);
    assert_eq!(doc.find_from(ul, "> li", false), ids(&[2, 4, 6, 8]));
    assert_eq!(doc.find_from(ul, "li", false), ids(&[2, 4, 6, 8]));
    assert_eq!(doc.find_from(NodeId(4), "li", false), ids(&[]));
    assert_eq!(doc.find_nth_from(ul, "li", 1, false), Some(NodeId(4)));
    assert_eq!(doc.find_from(NodeId(99), "li", false), ids(&[]));
}

#[test]
fn test_text_selector_matches_text_nodes() {
    let doc = parse(LIST);
    assert_eq!(doc.find("li text", false), ids(&[3, 5, 7, 9]));
    assert!(doc.find("text", false).iter().all(|&id| doc.is_text(id)));
}

#[test]
fn test_attribute_operators() {
    let doc = parse(LINKS);
    assert_eq!(texts(&doc, &doc.find(r#"a[href^="https"]"#, false)), ["1"]);
    // Anchors without href never pass a positive predicate.
    assert_eq!(texts(&doc, &doc.find(r##"a[href!="#"]"##, false)), ["1", "2"]);
    assert_eq!(texts(&doc, &doc.find("a[!href]", false)), ["4"]);
    assert_eq!(texts(&doc, &doc.find("a[href]", false)), ["1", "2", "3"]);
    assert_eq!(texts(&doc, &doc.find("a[href$=b]", false)), ["2"]);
    assert_eq!(texts(&doc, &doc.find("a[href*='//']", false)), ["1", "2"]);

    let doc = parse(r#"<p data-v="en-US main">x</p>"#);
    assert_eq!(doc.find(r#"p[data-v|="en"]"#, false).len(), 1);
    assert_eq!(doc.find("p[data-v~=main]", false).len(), 1);
    assert_eq!(doc.find("p[data-v~=en]", false).len(), 0);
    assert_eq!(doc.find("p[data-v=en-US]", false).len(), 0);
}

#[test]
fn test_negated_predicate_compares_empty_string() {
    let doc = parse(LINKS);
    assert_eq!(texts(&doc, &doc.find("a[!href=\"\"]", false)), ["4"]);
    assert_eq!(doc.find("a[!href=x]", false), ids(&[]));
}

#[test]
fn test_value_less_attribute_reads_as_empty() {
    let doc = parse("<input disabled><input>");
    assert_eq!(doc.find("input[disabled]", false), ids(&[1]));
    assert_eq!(doc.find("input[disabled=\"\"]", false), ids(&[1]));
}

#[test]
fn test_plaintext_predicate() {
    let doc = parse("<p>hello <b>world</b></p><p>bye</p>");
    assert_eq!(texts(&doc, &doc.find("p[plaintext*=world]", false)), ["hello world"]);
    assert_eq!(doc.find("p[plaintext]", false).len(), 2);
}

#[test]
fn test_case_flags() {
    let doc = parse(r#"<div title="Hello">x</div>"#);
    assert_eq!(doc.find(r#"div[title="hello"]"#, false).len(), 0);
    assert_eq!(doc.find(r#"div[title="hello" i]"#, false).len(), 1);
    assert_eq!(doc.find(r#"div[title="hello"]"#, true).len(), 1);
    assert_eq!(doc.find(r#"div[title="hello" s]"#, false).len(), 0);
    assert_eq!(doc.find(r#"div[title="hello" s]"#, true).len(), 1);
    assert_eq!(doc.find(r#"div[title="Hello" s]"#, false).len(), 1);
    assert_eq!(doc.find(r#"DIV[TITLE="Hello"]"#, false).len(), 1);
}

#[test]
fn test_lowercase_compare_of_tags_and_classes() {
    let doc = parse_keep_case(r#"<DIV class="Big">x</DIV>"#);
    assert_eq!(doc.find("div", false), ids(&[]));
    assert_eq!(doc.find("div", true), ids(&[1]));
    assert_eq!(doc.find("DIV", false), ids(&[1]));
    assert_eq!(doc.find(".big", false), ids(&[]));
    assert_eq!(doc.find(".big", true), ids(&[1]));
}

#[test]
fn test_id_uses_first_token() {
    let doc = parse(r#"<div id="a b">x</div>"#);
    assert_eq!(doc.find("#a", false).len(), 1);
    assert_eq!(doc.find("#b", false).len(), 0);
    assert_eq!(doc.element_by_id("a"), Some(NodeId(1)));
    assert_eq!(doc.element_by_id("b"), None);
}

#[test]
fn test_repeated_ids_are_all_returned() {
    let doc = parse(r#"<p id="dup">1</p><p id="other">2</p><span id="dup">3</span>"#);
    assert_eq!(doc.elements_by_id("dup"), ids(&[1, 5]));
    assert_eq!(doc.element_by_id("dup"), Some(NodeId(1)));
    assert_eq!(doc.elements_by_id("none"), ids(&[]));
}

#[test]
fn test_selector_list_is_unioned_in_document_order() {
    let doc = parse(PARAGRAPHS);
    assert_eq!(doc.find("p, div", false), ids(&[1, 2, 4]));
    assert_eq!(doc.find("p.a, p.b", false), ids(&[2, 4]));
}

#[test]
fn test_invalid_selectors_match_nothing() {
    let doc = parse(PARAGRAPHS);
    assert_eq!(doc.find("", false), ids(&[]));
    assert_eq!(doc.find("div >", false), ids(&[]));
    assert_eq!(doc.find("p[class", false), ids(&[]));
    assert_eq!(doc.find("p,,div", false), ids(&[]));
    assert_eq!(doc.find_nth("div >", 0, false), None);
}

#[test]
fn test_compile_reports_errors() {
    assert!(matches!(Selector::compile(" ", true), Err(SelectorError::Empty)));
    assert!(matches!(
        Selector::compile("a[x", true),
        Err(SelectorError::UnterminatedPredicate(1))
    ));
}

#[test]
fn test_compiled_selector_is_reusable() {
    let selector = Selector::compile("p", true).expect("valid selector");
    let first = parse(PARAGRAPHS);
    let second = parse("<p>only</p>");
    assert_eq!(selector.select(&first, first.root(), false).len(), 2);
    assert_eq!(selector.select(&second, second.root(), false).len(), 1);
}

#[test]
fn test_elements_by_tag_name() {
    let doc = parse(PARAGRAPHS);
    assert_eq!(doc.elements_by_tag_name("P"), ids(&[2, 4]));
    assert_eq!(doc.elements_by_tag_name("span"), ids(&[]));
}

#[test]
fn test_removed_nodes_never_match() {
    let mut doc = parse(PARAGRAPHS);
    doc.remove(NodeId(2)).expect("live node");
    assert_eq!(doc.find("p", false), ids(&[4]));
    assert_eq!(doc.find("text", false), ids(&[5]));
    assert!(doc.find("*", false).iter().all(|&id| doc.contains(id)));
}

#[test]
fn test_created_nodes_are_found() {
    let mut doc = parse(PARAGRAPHS);
    let span = doc.create_element("span");
    doc.append_child(NodeId(1), span).expect("attach");
    assert_eq!(doc.find("span", false), vec![span]);
    assert_eq!(doc.find("div > span", false), vec![span]);
}

#[test]
fn test_deeply_nested_descendants() {
    let depth = 10_000;
    let html = format!("{}{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let doc = parse(&html);
    assert_eq!(doc.find("div div", false).len(), depth - 1);
    assert_eq!(doc.find("div > div > div", false).len(), depth - 2);
}

#[test]
fn test_namespaced_tag_compiles_as_pseudo() {
    let doc = parse("<svg><svg:rect></svg:rect></svg>");
    assert_eq!(doc.tag(NodeId(2)), Some("svg:rect"));
    assert_eq!(doc.find("svg:rect", false), ids(&[1]));
    assert_eq!(doc.find("svg > *", false), ids(&[2]));
}

#[test]
fn test_attribute_without_leading_space_is_selectable() {
    let doc = parse(r#"<img src="a.png"alt="b">"#);
    assert_eq!(doc.find("img[alt]", false), ids(&[1]));
    assert_eq!(doc.find("img[alt=b][src$=png]", false), ids(&[1]));
}
