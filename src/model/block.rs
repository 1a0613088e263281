//! Block-level content types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A content block in the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text (headings, captions and placeholders included)
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// An embedded image
    Image {
        /// Resource ID for the image
        resource_id: String,
        /// Caption shown under the image
        caption: Option<String>,
        /// Display width in inches
        width: f32,
    },

    /// Hard page break
    PageBreak,
}

impl Block {
    /// Get the paragraph if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Get the table if this block is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Check if this block is a heading paragraph.
    pub fn is_heading(&self) -> bool {
        self.as_paragraph().is_some_and(|p| p.is_heading())
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Block::Paragraph(p) => Some(p.plain_text()),
            Block::Table(t) => Some(t.plain_text()),
            Block::Image { caption, .. } => caption.clone(),
            Block::PageBreak => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_accessors() {
        let heading = Block::Paragraph(Paragraph::heading("Results", 2));
        assert!(heading.is_heading());
        assert!(heading.as_table().is_none());
        assert_eq!(heading.plain_text().as_deref(), Some("Results"));

        assert!(!Block::PageBreak.is_heading());
        assert_eq!(Block::PageBreak.plain_text(), None);
    }
}
