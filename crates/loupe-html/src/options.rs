//! Parse configuration.

use loupe_dom::DocumentSettings;

/// Inputs larger than this many bytes are rejected by default.
pub const DEFAULT_MAX_SIZE: usize = 600_000;

/// Options for [`parse`](crate::parse).
///
/// Passed explicitly to every parse; there is no global configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Lowercase tag and attribute names.
    pub lowercase: bool,
    /// Apply the implicit-close recovery rules for misnested markup.
    /// When off, the input is trusted to be well formed: start tags never
    /// close ancestors and unmatched end tags are kept as text.
    pub force_tags_closed: bool,
    /// Replace every CR and LF with a space before parsing.
    pub normalize_newlines: bool,
    /// Also protect `{x...}` template directives from tokenizing.
    pub strip_template_directives: bool,
    /// Largest accepted input, in bytes.
    pub max_size: usize,
    /// Content given to every `br`; shows up in plain text.
    pub br_text: String,
    /// Appended after each `span` in plain text.
    pub span_text: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        let settings = DocumentSettings::default();
        Self {
            lowercase: settings.lowercase,
            force_tags_closed: true,
            normalize_newlines: false,
            strip_template_directives: false,
            max_size: DEFAULT_MAX_SIZE,
            br_text: settings.br_text,
            span_text: settings.span_text,
        }
    }
}

impl ParseOptions {
    /// Set [`ParseOptions::lowercase`].
    #[must_use]
    pub const fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Set [`ParseOptions::force_tags_closed`].
    #[must_use]
    pub const fn with_force_tags_closed(mut self, force: bool) -> Self {
        self.force_tags_closed = force;
        self
    }

    /// Set [`ParseOptions::normalize_newlines`].
    #[must_use]
    pub const fn with_normalize_newlines(mut self, normalize: bool) -> Self {
        self.normalize_newlines = normalize;
        self
    }

    /// Set [`ParseOptions::strip_template_directives`].
    #[must_use]
    pub const fn with_strip_template_directives(mut self, strip: bool) -> Self {
        self.strip_template_directives = strip;
        self
    }

    /// Set [`ParseOptions::max_size`].
    #[must_use]
    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set [`ParseOptions::br_text`].
    #[must_use]
    pub fn with_br_text(mut self, text: impl Into<String>) -> Self {
        self.br_text = text.into();
        self
    }

    /// Set [`ParseOptions::span_text`].
    #[must_use]
    pub fn with_span_text(mut self, text: impl Into<String>) -> Self {
        self.span_text = text.into();
        self
    }

    /// The part of these options a document keeps after parsing.
    #[must_use]
    pub fn document_settings(&self) -> DocumentSettings {
        DocumentSettings {
            lowercase: self.lowercase,
            br_text: self.br_text.clone(),
            span_text: self.span_text.clone(),
        }
    }
}
