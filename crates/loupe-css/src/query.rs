//! Index-range query engine and the [`Query`] extension trait.
//!
//! Evaluation is breadth-first: each chain starts from the scope node and
//! every compound step replaces the working set with the candidates that
//! pass it. Nothing recurses, so deep documents cost no stack.

use std::collections::BTreeSet;

use loupe_common::warning::warn_once;
use loupe_dom::{Document, NodeId};

use crate::selector::{Combinator, CompoundSelector, Selector};

pub(crate) fn run(selector: &Selector, doc: &Document, scope: NodeId, lowercase: bool) -> Vec<NodeId> {
    if !doc.contains(scope) {
        return Vec::new();
    }

    let mut found = BTreeSet::new();
    for chain in selector.chains() {
        let mut head = BTreeSet::from([scope]);
        for (combinator, compound) in &chain.steps {
            head = step(doc, &head, *combinator, compound, lowercase);
            if head.is_empty() {
                break;
            }
        }
        found.extend(head);
    }
    found.into_iter().collect()
}

fn step(
    doc: &Document,
    head: &BTreeSet<NodeId>,
    combinator: Combinator,
    compound: &CompoundSelector,
    lowercase: bool,
) -> BTreeSet<NodeId> {
    let keep = |id: &NodeId| compound.matches(doc, *id, lowercase);
    match combinator {
        Combinator::Descendant => {
            // Ranges of nested bases overlap; scan each table slot once.
            let mut next = BTreeSet::new();
            let mut scanned = 0;
            for &base in head {
                let range = doc.descendant_range(base);
                let start = range.start.max(scanned);
                scanned = scanned.max(range.end);
                next.extend((start..range.end).map(NodeId).filter(keep));
            }
            next
        }
        Combinator::Child => head
            .iter()
            .flat_map(|&base| doc.children(base))
            .copied()
            .filter(keep)
            .collect(),
        Combinator::NextSibling => head
            .iter()
            .filter_map(|&base| doc.next_sibling(base))
            .filter(keep)
            .collect(),
        Combinator::SubsequentSibling => head
            .iter()
            .flat_map(|&base| doc.self_and_following_siblings(base))
            .copied()
            .filter(keep)
            .collect(),
    }
}

/// Pick the `index`th entry; negative indices count from the end.
fn nth(found: &[NodeId], index: isize) -> Option<NodeId> {
    let position = if index < 0 {
        found.len().checked_sub(index.unsigned_abs())?
    } else {
        index.unsigned_abs()
    };
    found.get(position).copied()
}

/// Selector queries on a [`Document`].
///
/// `lowercase` makes tag, class and predicate comparisons case-insensitive,
/// overriding a predicate's `s` flag. A selector that does not compile logs a warning and
/// matches nothing.
pub trait Query {
    /// Matches anywhere in the document, in document order.
    fn find(&self, selector: &str, lowercase: bool) -> Vec<NodeId>;

    /// Matches under `scope`, in document order.
    fn find_from(&self, scope: NodeId, selector: &str, lowercase: bool) -> Vec<NodeId>;

    /// The `index`th match in the document; negative counts from the end.
    fn find_nth(&self, selector: &str, index: isize, lowercase: bool) -> Option<NodeId>;

    /// The `index`th match under `scope`; negative counts from the end.
    fn find_nth_from(&self, scope: NodeId, selector: &str, index: isize, lowercase: bool) -> Option<NodeId>;

    /// First element whose id is `id`.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Every element whose id is `id`; markup from the wild repeats ids.
    fn elements_by_id(&self, id: &str) -> Vec<NodeId>;

    /// Every element named `tag`.
    fn elements_by_tag_name(&self, tag: &str) -> Vec<NodeId>;
}

impl Query for Document {
    fn find(&self, selector: &str, lowercase: bool) -> Vec<NodeId> {
        self.find_from(self.root(), selector, lowercase)
    }

    fn find_from(&self, scope: NodeId, selector: &str, lowercase: bool) -> Vec<NodeId> {
        match Selector::compile(selector, self.settings().lowercase) {
            Ok(compiled) => compiled.select(self, scope, lowercase),
            Err(err) => {
                warn_once("Selector", &format!("{selector:?} matches nothing: {err}"));
                Vec::new()
            }
        }
    }

    fn find_nth(&self, selector: &str, index: isize, lowercase: bool) -> Option<NodeId> {
        self.find_nth_from(self.root(), selector, index, lowercase)
    }

    fn find_nth_from(&self, scope: NodeId, selector: &str, index: isize, lowercase: bool) -> Option<NodeId> {
        nth(&self.find_from(scope, selector, lowercase), index)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_by_id(id).first().copied()
    }

    fn elements_by_id(&self, id: &str) -> Vec<NodeId> {
        Selector::single(CompoundSelector::id(id)).select(self, self.root(), false)
    }

    fn elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        let lowercase = self.settings().lowercase;
        let tag = if lowercase {
            tag.to_ascii_lowercase()
        } else {
            tag.to_string()
        };
        Selector::single(CompoundSelector::tag(tag)).select(self, self.root(), lowercase)
    }
}
