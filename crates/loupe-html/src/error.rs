//! Load failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why no document was produced.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input exceeds [`ParseOptions::max_size`](crate::ParseOptions::max_size).
    #[error("input is {size} bytes, over the {max} byte limit")]
    TooLarge {
        /// Input length in bytes.
        size: usize,
        /// Configured limit.
        max: usize,
    },
    /// The input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}
