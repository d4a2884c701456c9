//! Hand-written selector compiler.
//!
//! Grammar, loosely:
//!
//! ```text
//! list      = chain ("," chain)*
//! chain     = combinator? compound (combinator? compound)*
//! compound  = tag? ("#" name | "." name | "[" predicate "]" | pseudo)*
//! predicate = "@"? "!"? attr-name (op value)? flag?
//! ```
//!
//! Whitespace between two compounds is the descendant combinator.

use std::iter::Peekable;
use std::mem;
use std::str::{CharIndices, FromStr};

use loupe_common::warning::warn_once;

use super::{
    AttrOperator, AttributeSelector, CaseSensitivity, Combinator, ComplexSelector,
    CompoundSelector, Selector, SelectorError,
};

type Chars<'a> = Peekable<CharIndices<'a>>;

/// Letters, digits, `_`, `-` and any non-ASCII character.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

fn take_while(chars: &mut Chars<'_>, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some((_, c)) = chars.next_if(|&(_, c)| keep(c)) {
        out.push(c);
    }
    out
}

fn skip_whitespace(chars: &mut Chars<'_>) {
    while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
}

/// The error for whatever the cursor is looking at: a stray character, or
/// an unterminated predicate if the input ran out.
fn unexpected(chars: &mut Chars<'_>, open: usize) -> SelectorError {
    match chars.peek() {
        Some(&(offset, ch)) => SelectorError::UnexpectedCharacter { ch, offset },
        None => SelectorError::UnterminatedPredicate(open),
    }
}

pub(super) fn compile(text: &str, lowercase_names: bool) -> Result<Selector, SelectorError> {
    if text.trim().is_empty() {
        return Err(SelectorError::Empty);
    }

    let mut chars = text.char_indices().peekable();
    let mut chains = Vec::new();
    let mut steps = Vec::new();
    let mut pending: Option<(Combinator, usize)> = None;

    loop {
        skip_whitespace(&mut chars);
        let Some(&(offset, c)) = chars.peek() else {
            break;
        };
        let explicit = match c {
            '>' => Some(Combinator::Child),
            '+' => Some(Combinator::NextSibling),
            '~' => Some(Combinator::SubsequentSibling),
            _ => None,
        };

        if c == ',' {
            let _ = chars.next();
            close_chain(&mut chains, &mut steps, pending.take(), offset)?;
        } else if let Some(combinator) = explicit {
            if let Some((combinator, offset)) = pending {
                return Err(SelectorError::DanglingCombinator { combinator, offset });
            }
            let _ = chars.next();
            pending = Some((combinator, offset));
        } else {
            let compound = read_compound(&mut chars, lowercase_names)?;
            let combinator = pending.take().map_or(Combinator::Descendant, |(c, _)| c);
            steps.push((combinator, compound));
        }
    }
    close_chain(&mut chains, &mut steps, pending, text.len())?;

    Ok(Selector { chains })
}

fn close_chain(
    chains: &mut Vec<ComplexSelector>,
    steps: &mut Vec<(Combinator, CompoundSelector)>,
    pending: Option<(Combinator, usize)>,
    offset: usize,
) -> Result<(), SelectorError> {
    if let Some((combinator, offset)) = pending {
        return Err(SelectorError::DanglingCombinator { combinator, offset });
    }
    if steps.is_empty() {
        return Err(SelectorError::EmptyChain(offset));
    }
    chains.push(ComplexSelector {
        steps: mem::take(steps),
    });
    Ok(())
}

fn read_compound(chars: &mut Chars<'_>, lowercase_names: bool) -> Result<CompoundSelector, SelectorError> {
    let mut compound = CompoundSelector::default();

    let tag = take_while(chars, |c| is_name_char(c) || c == '*');
    let mut consumed = !tag.is_empty();
    if consumed && tag != "*" {
        compound.tag = Some(if lowercase_names {
            tag.to_ascii_lowercase()
        } else {
            tag
        });
    }

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            '#' | '.' => {
                let _ = chars.next();
                let name = take_while(chars, is_name_char);
                if name.is_empty() {
                    return Err(SelectorError::UnexpectedCharacter { ch: c, offset });
                }
                if c == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
            }
            '[' => {
                let _ = chars.next();
                compound
                    .predicates
                    .push(read_predicate(chars, offset, lowercase_names)?);
            }
            ':' => {
                let _ = chars.next();
                skip_pseudo(chars, offset)?;
            }
            _ => break,
        }
        consumed = true;
    }

    if consumed {
        Ok(compound)
    } else {
        Err(unexpected(chars, 0))
    }
}

/// Read the inside of `[...]`; the `[` at `open` is already consumed.
fn read_predicate(
    chars: &mut Chars<'_>,
    open: usize,
    lowercase_names: bool,
) -> Result<AttributeSelector, SelectorError> {
    skip_whitespace(chars);
    let _ = chars.next_if(|&(_, c)| c == '@');
    let negated = chars.next_if(|&(_, c)| c == '!').is_some();
    let name = take_while(chars, |c| is_name_char(c) || c == ':');
    if name.is_empty() {
        return Err(unexpected(chars, open));
    }
    skip_whitespace(chars);

    let mut operator = String::new();
    if let Some((_, c)) = chars.next_if(|&(_, c)| matches!(c, '!' | '^' | '$' | '*' | '|' | '~')) {
        operator.push(c);
    }
    if let Some((_, c)) = chars.next_if(|&(_, c)| c == '=') {
        operator.push(c);
    }

    let matcher = if operator.is_empty() {
        None
    } else {
        let Ok(parsed) = AttrOperator::from_str(&operator) else {
            return Err(unexpected(chars, open));
        };
        skip_whitespace(chars);
        Some((parsed, read_value(chars, open)?))
    };

    skip_whitespace(chars);
    let case = match chars.next_if(|&(_, c)| matches!(c, 'i' | 'I' | 's' | 'S')) {
        Some((_, 'i' | 'I')) => CaseSensitivity::Insensitive,
        Some(_) => CaseSensitivity::Sensitive,
        None => CaseSensitivity::Default,
    };
    skip_whitespace(chars);
    if chars.next_if(|&(_, c)| c == ']').is_none() {
        return Err(unexpected(chars, open));
    }

    if !negated
        && matcher.is_none()
        && name.bytes().all(|b| b.is_ascii_digit())
        && let Ok(position) = name.parse()
    {
        return Ok(AttributeSelector::Position(position));
    }

    Ok(AttributeSelector::Test {
        name: if lowercase_names {
            name.to_ascii_lowercase()
        } else {
            name
        },
        negated,
        matcher,
        case,
    })
}

/// A quoted value runs to its closing quote; a bare one to `]` or whitespace.
fn read_value(chars: &mut Chars<'_>, open: usize) -> Result<String, SelectorError> {
    let Some((_, quote)) = chars.next_if(|&(_, c)| c == '"' || c == '\'') else {
        return Ok(take_while(chars, |c| c != ']' && !c.is_whitespace()));
    };
    let value = take_while(chars, |c| c != quote);
    if chars.next().is_none() {
        return Err(SelectorError::UnterminatedPredicate(open));
    }
    Ok(value)
}

/// Skip `:name`, `::name` and `:name(...)`; the first `:` at `colon` is
/// already consumed.
fn skip_pseudo(chars: &mut Chars<'_>, colon: usize) -> Result<(), SelectorError> {
    let element = chars.next_if(|&(_, c)| c == ':').is_some();
    let name = take_while(chars, is_name_char);
    if name.is_empty() {
        return Err(SelectorError::UnexpectedCharacter { ch: ':', offset: colon });
    }

    if let Some((paren, _)) = chars.next_if(|&(_, c)| c == '(') {
        let mut depth = 1_usize;
        for (_, c) in chars.by_ref() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                break;
            }
        }
        if depth != 0 {
            return Err(SelectorError::UnbalancedParenthesis(paren));
        }
    }

    let prefix = if element { "::" } else { ":" };
    warn_once(
        "Selector",
        &format!("unsupported pseudo selector '{prefix}{name}' ignored"),
    );
    Ok(())
}
