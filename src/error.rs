//! Error types for manudoc library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manudoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a manuscript.
///
/// Only failures that prevent producing a document at all are errors.
/// Missing images and malformed markup degrade to placeholders instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The source markup file could not be read.
    #[error("Cannot read source document {}: {source}", path.display())]
    Source {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The source markup is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// I/O error when writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error assembling the DOCX zip container.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error during rendering (JSON serialization, etc.).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A parse or render option is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}
