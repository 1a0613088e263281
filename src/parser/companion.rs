//! Figures-only and tables-only companion documents.
//!
//! Journals usually want figures and tables as separate files. Both are
//! built from what the assembler collected, so they always match the
//! main text.

use super::assembler::FigureRef;
use super::image::ResolvedImage;
use super::inline::format_inline;
use super::options::ParseOptions;
use crate::model::{Alignment, Block, Document, Metadata, Paragraph, Table, TextRun, TextStyle};

/// One page per figure: the image, then an italic `Figure N: caption` line.
pub fn figures_document(figures: &[FigureRef], options: &ParseOptions) -> Document {
    let mut doc = Document::new();
    doc.metadata = Metadata::with_title("Figures");
    doc.add_paragraph(Paragraph::heading("Figures", 1).align(Alignment::Center));

    for figure in figures {
        doc.add_page_break();

        let resource = figure.path.as_ref().and_then(|path| {
            ResolvedImage {
                path: path.clone(),
                width: options.image_width,
            }
            .load()
        });
        match resource {
            Some(resource) => {
                let id = format!("image{}", doc.resources.len() + 1);
                doc.add_resource(id.clone(), resource);
                doc.add_block(Block::Image {
                    resource_id: id,
                    caption: None,
                    width: options.image_width,
                });
            }
            None => {
                log::warn!("Figure {} has no image: {}", figure.number, figure.reference);
                let run = TextRun::styled(
                    format!("[IMAGE MISSING: {}]", figure.reference),
                    TextStyle {
                        color: Some("#FF0000".to_string()),
                        ..Default::default()
                    },
                );
                doc.add_paragraph(Paragraph::with_runs(vec![run]).align(Alignment::Center));
            }
        }

        let label = format!("Figure {}: {}", figure.number, figure.caption);
        let runs = format_inline(&label)
            .into_iter()
            .map(|mut run| {
                run.style.italic = true;
                run.style.font_size = Some(options.caption_font_size);
                run
            })
            .collect();
        let mut caption = Paragraph::with_runs(runs).align(Alignment::Center);
        caption.style.caption = true;
        doc.add_paragraph(caption);
    }

    doc
}

/// One page per table: its title (if any), then the table.
pub fn tables_document(tables: &[Table], options: &ParseOptions) -> Document {
    let mut doc = Document::new();
    let heading = options.tables_heading.as_str();
    doc.metadata = Metadata::with_title(heading);
    doc.add_paragraph(Paragraph::heading(heading, 1).align(Alignment::Center));

    for table in tables {
        doc.add_page_break();
        if let Some(title) = &table.title {
            doc.add_paragraph(Paragraph::with_runs(format_inline(title)));
        }
        doc.add_table(table.clone());
    }

    doc
}

/// The front matter of an unblinded document: everything before the first
/// page break or sub-heading (title, authors, affiliations, contacts).
pub fn title_page_document(doc: &Document) -> Document {
    let mut page = Document::new();
    page.metadata = doc.metadata.clone();

    for block in &doc.blocks {
        let body_starts = match block {
            Block::PageBreak => true,
            Block::Paragraph(p) => p.heading_level().is_some_and(|level| level > 1),
            _ => false,
        };
        if body_starts {
            break;
        }
        if let Block::Image { resource_id, .. } = block {
            if let Some(resource) = doc.get_resource(resource_id) {
                page.add_resource(resource_id.clone(), resource.clone());
            }
        }
        page.add_block(block.clone());
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;
    use std::fs;

    const PNG_2X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_figures_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("trend.png");
        fs::write(&path, PNG_2X1).unwrap();

        let figures = vec![
            FigureRef {
                number: 1,
                caption: "Resistance in *K. pneumoniae*".to_string(),
                reference: "trend.png".to_string(),
                path: Some(path),
            },
            FigureRef {
                number: 2,
                caption: "Scorecard".to_string(),
                reference: "scorecard.png".to_string(),
                path: None,
            },
        ];
        let doc = figures_document(&figures, &ParseOptions::default());

        assert_eq!(doc.resources.len(), 1);
        assert!(doc.blocks.iter().any(|b| matches!(b, Block::Image { .. })));
        assert_eq!(doc.blocks.iter().filter(|b| **b == Block::PageBreak).count(), 2);

        let captions: Vec<&Paragraph> = doc
            .blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .filter(|p| p.style.caption)
            .collect();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].plain_text(), "Figure 1: Resistance in K. pneumoniae");
        assert!(captions[0].runs.iter().all(|r| r.style.italic));
        assert!(doc.plain_text().contains("[IMAGE MISSING: scorecard.png]"));
    }

    #[test]
    fn test_tables_document() {
        let mut table = Table::new().with_title("**Table 1: Genes**");
        table.add_row(TableRow::from_strings(["Gene", "N"]));
        let doc = tables_document(&[table.clone(), Table::new()], &ParseOptions::default());

        assert_eq!(doc.metadata.title.as_deref(), Some("Tables"));
        assert_eq!(doc.tables().count(), 2);
        assert_eq!(doc.blocks[2].plain_text().as_deref(), Some("Table 1: Genes"));
        assert_eq!(doc.blocks[3], Block::Table(table));
    }

    #[test]
    fn test_title_page_document() {
        let mut doc = Document::new();
        doc.metadata = Metadata::with_title("Paper");
        doc.add_paragraph(Paragraph::heading("Paper", 1));
        doc.add_paragraph(Paragraph::with_text("Jane Doe, Author"));
        doc.add_paragraph(Paragraph::with_text("Email: jd@example.org"));
        doc.add_page_break();
        doc.add_paragraph(Paragraph::heading("Introduction", 2));
        doc.add_paragraph(Paragraph::with_text("Body."));

        let page = title_page_document(&doc);
        assert_eq!(page.blocks.len(), 3);
        assert_eq!(page.metadata.title.as_deref(), Some("Paper"));
        assert!(!page.plain_text().contains("Body."));
    }
}
