//! Compiled selectors and per-node matching.
//!
//! A selector is a comma-separated list of chains. Each chain is a run of
//! compound selectors joined by combinators:
//!
//! ```text
//! div#main > ul.nav li[data-x^="a" i]
//! [Descendant: div#main] --(Child)--> [ul.nav] --(Descendant)--> [li[data-x^=a i]]
//! ```
//!
//! Chains are stored left to right and evaluated from the query scope
//! outward, one compound step at a time.
//!
//! # Limitations
//!
//! A `:` after a tag name always starts a pseudo segment, so namespaced
//! tags such as `svg:rect` cannot be selected by name: `svg:rect` compiles
//! to a bare `svg`. Attribute names inside `[...]` may contain `:`.

mod parser;

use std::borrow::Cow;

use loupe_dom::{Document, NodeId, NodeKind};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Relationship between a compound selector and the step before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum Combinator {
    /// Whitespace: any node inside the previous match.
    #[strum(serialize = " ")]
    Descendant,
    /// `>`: a structural child of the previous match.
    #[strum(serialize = ">")]
    Child,
    /// `+`: the structural sibling right after the previous match.
    #[strum(serialize = "+")]
    NextSibling,
    /// `~`: the previous match itself and every structural sibling after it.
    #[strum(serialize = "~")]
    SubsequentSibling,
}

/// Comparison inside an attribute predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum AttrOperator {
    /// `=`
    #[strum(serialize = "=")]
    Equals,
    /// `!=`
    #[strum(serialize = "!=")]
    NotEquals,
    /// `^=`
    #[strum(serialize = "^=")]
    Prefix,
    /// `$=`
    #[strum(serialize = "$=")]
    Suffix,
    /// `*=`
    #[strum(serialize = "*=")]
    Substring,
    /// `|=`: plain prefix test, no hyphen handling.
    #[strum(serialize = "|=")]
    DashPrefix,
    /// `~=`: whitespace-separated token membership.
    #[strum(serialize = "~=")]
    Includes,
}

impl AttrOperator {
    /// Compare an attribute `value` against the predicate's `pattern`.
    #[must_use]
    pub fn evaluate(self, pattern: &str, value: &str, fold_case: bool) -> bool {
        let (pattern, value) = if fold_case {
            (
                Cow::Owned(pattern.to_ascii_lowercase()),
                Cow::Owned(value.to_ascii_lowercase()),
            )
        } else {
            (Cow::Borrowed(pattern), Cow::Borrowed(value))
        };
        match self {
            Self::Equals => value == pattern,
            Self::NotEquals => value != pattern,
            Self::Prefix | Self::DashPrefix => value.starts_with(pattern.as_ref()),
            Self::Suffix => value.ends_with(pattern.as_ref()),
            Self::Substring => value.contains(pattern.as_ref()),
            Self::Includes => value.split_whitespace().any(|token| token == pattern),
        }
    }
}

/// Trailing `i` / `s` flag of an attribute predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseSensitivity {
    /// No flag: follow the query's `lowercase` argument.
    #[default]
    Default,
    /// `i`
    Insensitive,
    /// `s`: exact, unless the query's `lowercase` folds everything anyway.
    Sensitive,
}

impl CaseSensitivity {
    /// Folding applies when either the flag or the query asks for it.
    const fn folds(self, lowercase: bool) -> bool {
        match self {
            Self::Insensitive => true,
            Self::Default | Self::Sensitive => lowercase,
        }
    }
}

/// One bracketed predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[N]`: the node is the Nth (0-based) structural sibling with its tag.
    Position(usize),
    /// `[name]`, `[!name]` or `[name op value flag]`.
    Test {
        /// Attribute name. `plaintext` tests the node's plain text instead.
        name: String,
        /// `[!name]`: the attribute must be absent.
        negated: bool,
        /// Operator and value, if any.
        matcher: Option<(AttrOperator, String)>,
        /// Case flag.
        case: CaseSensitivity,
    },
}

/// Conditions on a single node, all of which must hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// Tag name; `None` for an empty name or `*`.
    pub tag: Option<String>,
    /// `#id`, compared with the first whitespace token of the `id` attribute.
    pub id: Option<String>,
    /// `.class` names, each of which must be present.
    pub classes: Vec<String>,
    /// Bracketed predicates.
    pub predicates: Vec<AttributeSelector>,
}

/// Compound selectors with the combinator leading into each.
///
/// The first combinator relates the first compound to the query scope;
/// it is [`Combinator::Descendant`] unless the chain starts with one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    /// Steps in source order.
    pub steps: Vec<(Combinator, CompoundSelector)>,
}

/// A compiled selector list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    chains: Vec<ComplexSelector>,
}

/// Why a selector could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Nothing but whitespace.
    #[error("selector is empty")]
    Empty,
    /// `a,,b` or a trailing comma.
    #[error("empty selector in list at offset {0}")]
    EmptyChain(usize),
    /// A combinator with no compound selector after it.
    #[error("combinator '{combinator}' at offset {offset} is not followed by a selector")]
    DanglingCombinator {
        /// The combinator as written.
        combinator: Combinator,
        /// Byte offset in the selector text.
        offset: usize,
    },
    /// `[` without a matching `]`.
    #[error("unterminated attribute predicate at offset {0}")]
    UnterminatedPredicate(usize),
    /// `:pseudo(` without a matching `)`.
    #[error("unbalanced parenthesis at offset {0}")]
    UnbalancedParenthesis(usize),
    /// A character that cannot appear where it does.
    #[error("unexpected {ch:?} at offset {offset}")]
    UnexpectedCharacter {
        /// The character.
        ch: char,
        /// Byte offset in the selector text.
        offset: usize,
    },
}

impl Selector {
    /// Compile `text`. With `lowercase_names`, tag and attribute names are
    /// lowercased to match a document parsed with lowercasing on.
    ///
    /// `:pseudo` and `::pseudo` segments are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] describing the first problem found.
    pub fn compile(text: &str, lowercase_names: bool) -> Result<Self, SelectorError> {
        parser::compile(text, lowercase_names)
    }

    /// A selector with a single one-step chain.
    #[must_use]
    pub fn single(compound: CompoundSelector) -> Self {
        Self {
            chains: vec![ComplexSelector {
                steps: vec![(Combinator::Descendant, compound)],
            }],
        }
    }

    /// The comma-separated chains.
    #[must_use]
    pub fn chains(&self) -> &[ComplexSelector] {
        &self.chains
    }

    /// Every node under `scope` matched by any chain, in document order.
    ///
    /// With `lowercase`, tag names, classes and predicate values compare
    /// case-insensitively whatever their flag.
    #[must_use]
    pub fn select(&self, doc: &Document, scope: NodeId, lowercase: bool) -> Vec<NodeId> {
        crate::query::run(self, doc, scope, lowercase)
    }
}

impl CompoundSelector {
    /// A compound matching one tag name.
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// A compound matching one id.
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Check one candidate node.
    ///
    /// Candidates must be structural children of some parent; the root and
    /// bare text are skipped. A `text` tag is the exception: it matches text
    /// nodes directly and ignores every other condition.
    #[must_use]
    pub fn matches(&self, doc: &Document, id: NodeId, lowercase: bool) -> bool {
        let Some(node) = doc.get(id) else {
            return false;
        };
        if node.parent().is_none() {
            return false;
        }
        if node.kind() == NodeKind::Text {
            return self.tag.as_deref() == Some("text");
        }

        if let Some(tag) = &self.tag {
            let same = if lowercase {
                node.tag().eq_ignore_ascii_case(tag)
            } else {
                node.tag() == tag
            };
            if !same {
                return false;
            }
        }

        let attrs = node.attributes();
        if let Some(wanted) = &self.id {
            let first = attrs
                .get("id")
                .and_then(|value| value.as_str().split_whitespace().next());
            if first != Some(wanted.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let Some(value) = attrs.get("class") else {
                return false;
            };
            let present: Vec<&str> = value.as_str().split_whitespace().collect();
            let has = |class: &String| {
                present.iter().any(|token| {
                    if lowercase {
                        token.eq_ignore_ascii_case(class)
                    } else {
                        token == class
                    }
                })
            };
            if !self.classes.iter().all(has) {
                return false;
            }
        }

        self.predicates
            .iter()
            .all(|predicate| predicate.matches(doc, id, lowercase))
    }
}

impl AttributeSelector {
    fn matches(&self, doc: &Document, id: NodeId, lowercase: bool) -> bool {
        match self {
            Self::Position(index) => doc.same_tag_position(id) == Some(*index),
            Self::Test {
                name,
                negated,
                matcher,
                case,
            } => {
                let value: Cow<'_, str> = if *negated {
                    if doc.has_attr(id, name) {
                        return false;
                    }
                    Cow::Borrowed("")
                } else if name == "plaintext" {
                    if matcher.is_none() {
                        return true;
                    }
                    Cow::Owned(doc.text_content(id))
                } else {
                    match doc.attr(id, name) {
                        Some(value) => doc.restore(value.as_str()),
                        None => return false,
                    }
                };
                matcher.as_ref().is_none_or(|(operator, pattern)| {
                    operator.evaluate(pattern, &value, case.folds(lowercase))
                })
            }
        }
    }
}
