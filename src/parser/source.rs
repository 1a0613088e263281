//! Source markup loading.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

const BOM: char = '\u{FEFF}';

/// An ordered, immutable list of raw markup lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    lines: Vec<String>,
}

impl SourceDocument {
    /// Split markup text into lines, tolerating CRLF and a leading BOM.
    pub fn from_text(text: &str) -> Self {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Read a UTF-8 markup file.
    ///
    /// This is the only fallible step of a conversion: an unreadable or
    /// non-UTF-8 source aborts, everything downstream degrades gracefully.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::Source {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            Error::Encoding(format!("{} is not valid UTF-8: {}", path.display(), e))
        })?;
        log::debug!("Read {} bytes of markup from {}", text.len(), path.display());
        Ok(Self::from_text(&text))
    }

    /// Lines in source order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the source has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
