//! Plain text rendering.

use crate::model::{Block, Document};

/// Convert a document to plain text.
///
/// Blocks are separated by blank lines. List items keep their marker,
/// table rows are tab-separated and images appear as `[Figure: caption]`.
pub fn to_text(doc: &Document) -> String {
    let mut parts = Vec::new();
    for block in &doc.blocks {
        let text = match block {
            Block::Paragraph(p) => match &p.style.list_info {
                Some(info) => format!("{} {}", info.label(), p.plain_text()),
                None => p.plain_text(),
            },
            Block::Table(table) => table.plain_text(),
            Block::Image {
                caption, resource_id, ..
            } => format!("[Figure: {}]", caption.as_deref().unwrap_or(resource_id)),
            Block::PageBreak => continue,
        };
        if !text.trim().is_empty() {
            parts.push(text);
        }
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListInfo, Paragraph, Table, TableRow};

    #[test]
    fn test_to_text() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::heading("Results", 2));
        doc.add_page_break();
        doc.add_paragraph(Paragraph::with_text("Hello, world!"));
        let mut item = Paragraph::with_text("first");
        item.style.list_info = Some(ListInfo::bullet());
        doc.add_paragraph(item);
        doc.add_paragraph(Paragraph::new());

        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["a", "b"]));
        doc.add_table(table);
        doc.add_block(Block::Image {
            resource_id: "image1".to_string(),
            caption: Some("Trend".to_string()),
            width: 6.0,
        });

        assert_eq!(
            to_text(&doc),
            "Results\n\nHello, world!\n\n\u{2022} first\n\na\tb\n\n[Figure: Trend]"
        );
    }
}
