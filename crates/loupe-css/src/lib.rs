//! Selector compilation and queries for loupe documents.
//!
//! # Scope
//!
//! - **Selector compiler** ([`Selector::compile`]): comma-separated chains
//!   of compound selectors joined by descendant, `>`, `+` and `~`
//!   combinators. Compounds take a tag (or `*`), `#id`, `.class` lists and
//!   `[predicate]`s with `=`, `!=`, `^=`, `$=`, `*=`, `|=`, `~=` and an
//!   `i`/`s` case flag. `[!name]` tests absence and `[N]` picks the Nth
//!   sibling of the same tag.
//! - **Query engine** ([`Selector::select`], [`Query`]): walks table index
//!   ranges instead of recursing, unions the chains and returns handles in
//!   document order.
//!
//! # Not implemented
//!
//! - Pseudo-classes and pseudo-elements: they are skipped with a warning
//! - Specificity and the cascade

/// Query engine and the `Query` trait.
pub mod query;
/// Selector types, compiler and per-node matching.
pub mod selector;

pub use query::Query;
pub use selector::{
    AttrOperator, AttributeSelector, CaseSensitivity, Combinator, ComplexSelector,
    CompoundSelector, Selector, SelectorError,
};
