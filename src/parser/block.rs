//! Line classification.

use crate::model::ListMarker;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)]*)\)$").expect("valid image pattern"));

static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,9})\.\s+(.*)$").expect("valid numbered list pattern"));

/// The structural role of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceBlock {
    /// `#`, `##` or `###` heading
    Heading {
        /// 1-3
        level: u8,
        /// Heading text without the hashes
        text: String,
    },
    /// `![caption](path)` image reference
    ImageRef {
        /// Decoded filesystem path
        path: String,
        /// Alt text, used as the caption
        caption: String,
    },
    /// `| a | b |` table row
    TableRow(Vec<String>),
    /// `- item`, `* item` or `1. item`
    ListItem {
        /// Bullet or number
        marker: ListMarker,
        /// Item text after the marker
        text: String,
    },
    /// Anything else
    Paragraph(String),
    /// `---`
    Rule,
    /// Whitespace only
    Blank,
}

impl SourceBlock {
    /// Check if this is a table row.
    pub fn is_table_row(&self) -> bool {
        matches!(self, SourceBlock::TableRow(_))
    }

    /// Check if this is a blank line.
    pub fn is_blank(&self) -> bool {
        matches!(self, SourceBlock::Blank)
    }
}

/// Classify a raw line. Never fails: unrecognized lines are paragraphs.
pub fn classify(line: &str, recognize_lists: bool) -> SourceBlock {
    let line = line.trim();

    if line.is_empty() {
        return SourceBlock::Blank;
    }
    if line == "---" {
        return SourceBlock::Rule;
    }
    if let Some((level, text)) = heading(line) {
        return SourceBlock::Heading {
            level,
            text: text.to_string(),
        };
    }
    if let Some(caps) = IMAGE.captures(line) {
        let caption = caps.get(1).map_or("", |m| m.as_str());
        let raw = caps.get(2).map_or("", |m| m.as_str());
        return SourceBlock::ImageRef {
            path: decode_image_path(raw),
            caption: caption.to_string(),
        };
    }
    if line.starts_with('|') {
        return SourceBlock::TableRow(split_row(line));
    }
    if recognize_lists {
        if let Some(block) = list_item(line) {
            return block;
        }
    }
    SourceBlock::Paragraph(line.to_string())
}

fn heading(line: &str) -> Option<(u8, &str)> {
    for (prefix, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some((level, rest.trim()));
        }
    }
    None
}

fn list_item(line: &str) -> Option<SourceBlock> {
    let bullet = line.strip_prefix("- ").or_else(|| line.strip_prefix("* "));
    if let Some(text) = bullet {
        return Some(SourceBlock::ListItem {
            marker: ListMarker::Bullet,
            text: text.trim().to_string(),
        });
    }

    let caps = NUMBERED.captures(line)?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    Some(SourceBlock::ListItem {
        marker: ListMarker::Number(number),
        text: caps.get(2)?.as_str().trim().to_string(),
    })
}

/// Split a `|`-delimited row, dropping the pieces outside the outer pipes.
fn split_row(line: &str) -> Vec<String> {
    let mut pieces: Vec<&str> = line.split('|').collect();
    if pieces.first().is_some_and(|p| p.trim().is_empty()) {
        pieces.remove(0);
    }
    if pieces.last().is_some_and(|p| p.trim().is_empty()) {
        pieces.pop();
    }
    pieces.into_iter().map(|p| p.trim().to_string()).collect()
}

/// Turn an image link target into a filesystem path.
///
/// `file:///C:/x.png` becomes `C:/x.png`, `file:///tmp/x.png` becomes
/// `/tmp/x.png`, and `%20`-style escapes are decoded.
pub fn decode_image_path(raw: &str) -> String {
    let mut path = raw.trim();
    if let Some(rest) = path.strip_prefix("file://") {
        path = rest;
        let bytes = path.as_bytes();
        let drive_letter =
            bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':';
        if drive_letter {
            path = &path[1..];
        }
    }
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}
