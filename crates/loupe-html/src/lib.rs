//! Tolerant HTML parsing for loupe.
//!
//! # Scope
//!
//! This crate turns arbitrary text into a [`Document`]:
//! - **Cursor** ([`tokenizer::Cursor`]): byte scanning primitives
//! - **Noise extraction** ([`parser::noise`]): scripts, styles, `code` bodies, comments,
//!   CDATA and processing instructions are vaulted before tree building
//! - **Tree builder** ([`HTMLParser`]): tag reading with implicit-close
//!   recovery; anything unreadable is kept as literal text
//!
//! Parsing never fails on content. The only load failure is an input over
//! [`ParseOptions::max_size`].
//!
//! # Not implemented
//!
//! - HTML5 tree construction (insertion modes, foster parenting)
//! - Character references: text is kept exactly as written
//! - Charset detection and transcoding

mod error;
mod options;
/// Tree construction.
pub mod parser;
/// Scanning primitives.
pub mod tokenizer;

use std::fs;
use std::path::Path;

pub use error::LoadError;
use loupe_dom::Document;
pub use options::{DEFAULT_MAX_SIZE, ParseOptions};
pub use parser::HTMLParser;

/// Parse `input` into a document.
///
/// # Errors
///
/// [`LoadError::TooLarge`] if `input` is longer than `options.max_size`
/// bytes; no partial document is built.
pub fn parse(input: &str, options: &ParseOptions) -> Result<Document, LoadError> {
    if input.len() > options.max_size {
        return Err(LoadError::TooLarge {
            size: input.len(),
            max: options.max_size,
        });
    }
    Ok(HTMLParser::new(input, options).run())
}

/// Read and parse a file.
///
/// # Errors
///
/// [`LoadError::Io`] if the file cannot be read as UTF-8 text, otherwise as
/// for [`parse`].
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Document, LoadError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&input, options)
}
