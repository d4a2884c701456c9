//! Ordered attribute lists.
//!
//! Every attribute remembers the whitespace around its name and `=` and the
//! quote style of its value, so an untouched start tag can be rebuilt
//! byte-for-byte.

use serde::Serialize;
use strum_macros::Display;

/// The value of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttrValue {
    /// `name="value"`, `name='value'` or `name=value`.
    Text(String),
    /// A bare `name` with no value (`checked`, `nowrap`, ...).
    Present,
}

impl AttrValue {
    /// The value as text. A value-less attribute reads as the empty string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Present => "",
        }
    }

    /// Returns `true` for a bare attribute without `=`.
    #[must_use]
    pub const fn is_present_only(&self) -> bool {
        matches!(self, Self::Present)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// How an attribute value was quoted in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
pub enum QuoteStyle {
    /// `"value"`
    #[default]
    Double,
    /// `'value'`
    Single,
    /// `value`
    None,
}

impl QuoteStyle {
    /// The quote character(s) written around a value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Double => "\"",
            Self::Single => "'",
            Self::None => "",
        }
    }
}

/// Whitespace recorded around one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AttrSpacing {
    /// Between the previous token and the attribute name.
    pub before_name: String,
    /// Between the name and `=`.
    pub before_equals: String,
    /// Between `=` and the value.
    pub after_equals: String,
}

impl AttrSpacing {
    /// Formatting used for attributes created after parsing: one leading space.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            before_name: " ".to_string(),
            ..Self::default()
        }
    }
}

/// A single attribute with its formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name, case-normalized per document policy.
    pub name: String,
    /// Attribute value.
    pub value: AttrValue,
    /// Source quote style.
    pub quote: QuoteStyle,
    /// Source whitespace.
    pub spacing: AttrSpacing,
    /// Value text as written, when reads see a normalized `value`.
    pub source: Option<String>,
}

impl Attribute {
    /// Create an attribute with default formatting (`name="value"` after one space).
    #[must_use]
    pub fn new(name: impl Into<String>, value: AttrValue) -> Self {
        let quote = if value.is_present_only() {
            QuoteStyle::None
        } else {
            QuoteStyle::Double
        };
        Self {
            name: name.into(),
            value,
            quote,
            spacing: AttrSpacing::standard(),
            source: None,
        }
    }

    /// Append this attribute's markup to `out`.
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.spacing.before_name);
        out.push_str(&self.name);
        if let AttrValue::Text(value) = &self.value {
            let quote = self.quote.as_str();
            out.push_str(&self.spacing.before_equals);
            out.push('=');
            out.push_str(&self.spacing.after_equals);
            out.push_str(quote);
            out.push_str(self.source.as_deref().unwrap_or(value));
            out.push_str(quote);
        }
    }
}

/// Attributes of one element, in source order, with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    list: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate attributes in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.list.iter()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.list.iter().position(|attr| attr.name == name)
    }

    /// Look up an attribute value by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.get_attribute(name).map(|attr| &attr.value)
    }

    /// Look up a whole attribute (value and formatting) by exact name.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.position(name).map(|i| &self.list[i])
    }

    /// Returns `true` if an attribute with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append a parsed attribute. The first occurrence of a name wins:
    /// returns `false` and discards `attr` when the name already exists.
    pub fn push(&mut self, attr: Attribute) -> bool {
        if self.contains(&attr.name) {
            return false;
        }
        self.list.push(attr);
        true
    }

    /// Set a value. Existing attributes keep their position and spacing;
    /// new ones are appended with [`AttrSpacing::standard`] and double quotes.
    pub fn set(&mut self, name: &str, value: AttrValue) {
        match self.position(name) {
            Some(i) => {
                let attr = &mut self.list[i];
                if value.is_present_only() {
                    attr.quote = QuoteStyle::None;
                } else if attr.value.is_present_only() {
                    attr.quote = QuoteStyle::Double;
                }
                attr.value = value;
                attr.source = None;
            }
            None => self.list.push(Attribute::new(name, value)),
        }
    }

    /// Remove an attribute, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.position(name).map(|i| self.list.remove(i))
    }

    /// Attribute names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(|attr| attr.name.as_str())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}
