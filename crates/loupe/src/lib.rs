//! High-level API for the loupe HTML toolkit.
//!
//! # Scope
//!
//! This crate provides:
//! - **Document Loading** - read and parse HTML from a file or a string
//! - **Querying** - selector queries through the [`Query`] trait
//! - **Saving** - write a (possibly edited) document back to disk
//!
//! The building blocks are re-exported as [`common`], [`dom`], [`html`]
//! and [`css`].

pub use loupe_common as common;
pub use loupe_css as css;
pub use loupe_dom as dom;
pub use loupe_html as html;

pub use loupe_css::{Query, Selector};
pub use loupe_dom::{Document, NodeId};
pub use loupe_html::{LoadError, ParseOptions};

use std::fs;
use std::io;
use std::path::Path;

use loupe_common::warning::clear_warnings;

/// A parsed document together with where it came from.
#[derive(Debug)]
pub struct LoadedDocument {
    /// Original HTML source
    pub html_source: String,

    /// Source path, empty for documents parsed from a string
    pub source_path: String,

    /// Parsed document
    pub document: Document,

    /// Recovery messages, one per repaired construct
    pub parse_issues: Vec<String>,
}

/// Load a document from a file path.
///
/// # Errors
///
/// [`LoadError::Io`] if the file cannot be read, [`LoadError::TooLarge`]
/// if it exceeds `options.max_size`.
pub fn load_document(path: impl AsRef<Path>, options: &ParseOptions) -> Result<LoadedDocument, LoadError> {
    let path = path.as_ref();
    let html_source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut loaded = parse_html_string(&html_source, options)?;
    loaded.source_path = path.display().to_string();
    Ok(loaded)
}

/// Parse an HTML string into a [`LoadedDocument`].
///
/// Use this when you already have the HTML content as a string.
///
/// # Errors
///
/// [`LoadError::TooLarge`] if `html` exceeds `options.max_size`.
pub fn parse_html_string(html: &str, options: &ParseOptions) -> Result<LoadedDocument, LoadError> {
    // Warnings are deduplicated per document.
    clear_warnings();

    let document = loupe_html::parse(html, options)?;
    let parse_issues = document
        .issues()
        .iter()
        .map(|issue| format!("{} at byte {}: {}", issue.kind, issue.offset, issue.message))
        .collect();

    Ok(LoadedDocument {
        html_source: html.to_string(),
        source_path: String::new(),
        document,
        parse_issues,
    })
}

/// Write a document's markup to `path`.
///
/// # Errors
///
/// Any I/O error from creating or writing the file.
pub fn save_document(document: &Document, path: impl AsRef<Path>) -> io::Result<()> {
    document.save(path)
}

impl LoadedDocument {
    /// Returns `true` if the serialized document still equals its source.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.document.to_html() == self.html_source
    }
}
