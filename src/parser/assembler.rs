//! Document assembly.
//!
//! [`DocumentAssembler`] drives the classified line stream through an
//! explicit state machine and emits the output [`Document`]:
//!
//! - `Normal`: each block is dispatched to its handler.
//! - `InTable`: table rows are buffered; any other block freezes the table
//!   and is then handled in `Normal`.
//! - `SkippingSection`: blocks are dropped until a heading of the same or
//!   higher rank, used for the source's own tables section in deferred mode.

use super::block::{classify, SourceBlock};
use super::image::{ImageResolver, ResolvedImage};
use super::inline::format_inline;
use super::options::{FigureMode, ParseOptions};
use super::source::SourceDocument;
use super::symbols::normalize_symbols;
use super::table::TableAccumulator;
use crate::model::{
    Alignment, Block, Document, ListInfo, ListMarker, Paragraph, Table, TextRun, TextStyle,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

const MISSING_IMAGE_COLOR: &str = "#FF0000";

/// An image reference seen during assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureRef {
    /// 1-based position among the image references
    pub number: usize,
    /// Alt text of the reference
    pub caption: String,
    /// Path as written in the source (decoded)
    pub reference: String,
    /// Resolved file, if one was found
    pub path: Option<PathBuf>,
}

/// Counts of what the assembler emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    /// Headings emitted (the generated tables heading included)
    pub headings: usize,
    /// Body, caption and placeholder paragraphs
    pub paragraphs: usize,
    /// List item paragraphs
    pub list_items: usize,
    /// Tables frozen
    pub tables: usize,
    /// Images embedded
    pub images: usize,
    /// Page breaks inserted
    pub page_breaks: usize,
    /// Image references that resolved to no file
    pub missing_images: Vec<String>,
}

/// The result of assembling one source document.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The output document
    pub document: Document,
    /// What was emitted
    pub stats: AssemblyStats,
    /// Every image reference, in source order
    pub figures: Vec<FigureRef>,
    /// Every table, in source order, whether emitted inline or deferred
    pub tables: Vec<Table>,
}

#[derive(Debug)]
enum State {
    Normal,
    InTable(TableAccumulator),
    SkippingSection { level: u8 },
}

/// Streams source lines into a [`Document`].
#[derive(Debug)]
pub struct DocumentAssembler {
    options: ParseOptions,
    resolver: ImageResolver,
    state: State,
    document: Document,
    stats: AssemblyStats,
    figures: Vec<FigureRef>,
    tables: Vec<Table>,
    deferred: Vec<Table>,
    pending_title: Option<String>,
    image_ids: HashMap<PathBuf, String>,
}

impl DocumentAssembler {
    /// Create an assembler.
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            options: options.clone(),
            resolver: ImageResolver::from_options(options),
            state: State::Normal,
            document: Document::new(),
            stats: AssemblyStats::default(),
            figures: Vec::new(),
            tables: Vec::new(),
            deferred: Vec::new(),
            pending_title: None,
            image_ids: HashMap::new(),
        }
    }

    /// Assemble a whole source document.
    pub fn assemble(mut self, source: &SourceDocument) -> Assembly {
        for line in source.lines() {
            self.feed_line(line);
        }
        self.finish()
    }

    /// Classify and process one raw line.
    pub fn feed_line(&mut self, line: &str) {
        let block = classify(line, self.options.recognize_lists);
        self.process(block);
    }

    /// Process one classified block.
    pub fn process(&mut self, block: SourceBlock) {
        match std::mem::replace(&mut self.state, State::Normal) {
            State::Normal => self.process_normal(block),
            State::InTable(mut acc) => match block {
                SourceBlock::TableRow(cells) => {
                    acc.push_row(cells);
                    self.state = State::InTable(acc);
                }
                other => {
                    self.flush_table(acc);
                    self.process_normal(other);
                }
            },
            State::SkippingSection { level } => match block {
                SourceBlock::Heading { level: next, .. } if next <= level => {
                    log::debug!("Leaving skipped section at level {} heading", next);
                    self.process_normal(block);
                }
                _ => self.state = State::SkippingSection { level },
            },
        }
    }

    /// Flush open state and return the finished document.
    pub fn finish(mut self) -> Assembly {
        if let State::InTable(acc) = std::mem::replace(&mut self.state, State::Normal) {
            self.flush_table(acc);
        }
        self.release_pending_title();

        if self.options.defer_tables && !self.deferred.is_empty() {
            self.append_tables_section();
        }

        if self.document.metadata.title.is_none() {
            let title = self
                .document
                .headings()
                .find(|(level, _)| *level == 1)
                .map(|(_, text)| text);
            self.document.metadata.title = title;
        }

        log::debug!(
            "Assembled {} blocks ({} tables, {} images, {} missing)",
            self.document.blocks.len(),
            self.stats.tables,
            self.stats.images,
            self.stats.missing_images.len()
        );

        Assembly {
            document: self.document,
            stats: self.stats,
            figures: self.figures,
            tables: self.tables,
        }
    }

    fn process_normal(&mut self, block: SourceBlock) {
        if self.options.blinded && is_identifying(&block) {
            log::debug!("Blinded: dropped {:?}", block);
            return;
        }

        if self.pending_title.is_some() {
            match block {
                // Blank lines between a table title and its table are swallowed.
                SourceBlock::Blank => return,
                SourceBlock::TableRow(_) => {}
                _ => self.release_pending_title(),
            }
        }

        match block {
            SourceBlock::Heading { level, text } => self.handle_heading(level, text),
            SourceBlock::Paragraph(text) => self.handle_paragraph(text),
            SourceBlock::ListItem { marker, text } => self.handle_list_item(marker, &text),
            SourceBlock::ImageRef { path, caption } => self.handle_image(path, caption),
            SourceBlock::TableRow(cells) => {
                let mut acc = TableAccumulator::new(self.pending_title.take());
                acc.push_row(cells);
                self.state = State::InTable(acc);
            }
            SourceBlock::Blank => {
                if self.options.blank_line_spacing && !self.document.is_empty() {
                    self.document.add_paragraph(Paragraph::new());
                }
            }
            SourceBlock::Rule => {}
        }
    }

    fn handle_heading(&mut self, level: u8, text: String) {
        if self.options.defer_tables && text == self.options.tables_heading {
            log::debug!("Skipping source section '{}'", text);
            self.state = State::SkippingSection { level };
            return;
        }

        if self.options.page_break_level == Some(level) {
            self.page_break();
        }
        self.push_heading(text, level);
    }

    fn handle_paragraph(&mut self, text: String) {
        if text.starts_with("**Table") {
            self.pending_title = Some(text);
            return;
        }

        if let Some(inner) = caption_text(&text) {
            if self.options.figure_mode == FigureMode::Omit && inner.starts_with("Figure") {
                return;
            }
            let runs = self
                .format(inner)
                .into_iter()
                .map(|mut run| {
                    run.style.italic = true;
                    run.style.font_size = Some(self.options.caption_font_size);
                    run
                })
                .collect();
            let mut paragraph = Paragraph::with_runs(runs).align(Alignment::Center);
            paragraph.style.caption = true;
            self.push_paragraph(paragraph);
            return;
        }

        let runs = self.format(&text);
        self.push_paragraph(Paragraph::with_runs(runs));
    }

    fn handle_list_item(&mut self, marker: ListMarker, text: &str) {
        let mut paragraph = Paragraph::with_runs(self.format(text));
        paragraph.style.list_info = Some(ListInfo { marker });
        self.stats.list_items += 1;
        self.document.add_paragraph(paragraph);
    }

    fn handle_image(&mut self, reference: String, caption: String) {
        let resolved = self.resolver.resolve(&reference);
        self.figures.push(FigureRef {
            number: self.figures.len() + 1,
            caption: caption.clone(),
            reference: reference.clone(),
            path: resolved.as_ref().map(|r| r.path.clone()),
        });

        match self.options.figure_mode {
            FigureMode::Omit => {}
            FigureMode::Placeholder => {
                let label = if caption.is_empty() { &reference } else { &caption };
                let marker = TextRun::bold(format!("[INSERT FIGURE HERE: {}]", label));
                let paragraph = Paragraph::with_runs(vec![marker]).align(Alignment::Center);
                self.push_paragraph(paragraph);
            }
            FigureMode::Inline => match resolved {
                Some(image) => self.embed_image(&image, &reference, caption),
                None => {
                    log::warn!("Image not found: {}", reference);
                    self.stats.missing_images.push(reference.clone());
                    self.push_paragraph(missing_image_paragraph(&reference));
                }
            },
        }
    }

    fn embed_image(&mut self, image: &ResolvedImage, reference: &str, caption: String) {
        let Some(resource_id) = self.resource_id(image) else {
            self.push_paragraph(Paragraph::with_text(format!(
                "[Could not load image: {}]",
                reference
            )));
            return;
        };

        log::debug!("Embedded {} as {}", image.path.display(), resource_id);
        self.stats.images += 1;
        self.document.add_block(Block::Image {
            resource_id,
            caption: (!caption.is_empty()).then_some(caption),
            width: image.width,
        });
    }

    /// Resource id for an image, loading it on first use.
    fn resource_id(&mut self, image: &ResolvedImage) -> Option<String> {
        if let Some(id) = self.image_ids.get(&image.path) {
            return Some(id.clone());
        }
        let resource = image.load()?;
        let id = format!("image{}", self.document.resources.len() + 1);
        self.document.add_resource(id.clone(), resource);
        self.image_ids.insert(image.path.clone(), id.clone());
        Some(id)
    }

    fn flush_table(&mut self, acc: TableAccumulator) {
        let table = acc.freeze(self.options.normalize_symbols);
        self.stats.tables += 1;
        self.tables.push(table.clone());
        if self.options.defer_tables {
            self.deferred.push(table);
        } else {
            self.emit_table(table);
        }
    }

    fn emit_table(&mut self, table: Table) {
        if let Some(title) = &table.title {
            let runs = self.format(title);
            self.push_paragraph(Paragraph::with_runs(runs));
        }
        self.document.add_table(table);
    }

    fn release_pending_title(&mut self) {
        if let Some(title) = self.pending_title.take() {
            let runs = self.format(&title);
            self.push_paragraph(Paragraph::with_runs(runs));
        }
    }

    fn append_tables_section(&mut self) {
        self.page_break();
        self.push_heading(self.options.tables_heading.clone(), 1);
        for table in std::mem::take(&mut self.deferred) {
            self.emit_table(table);
        }
    }

    fn page_break(&mut self) {
        self.stats.page_breaks += 1;
        self.document.add_page_break();
    }

    fn push_heading(&mut self, text: String, level: u8) {
        let mut heading = Paragraph::heading(text, level);
        if level == 1 {
            heading = heading.align(Alignment::Center);
        }
        self.stats.headings += 1;
        self.document.add_paragraph(heading);
    }

    fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.stats.paragraphs += 1;
        self.document.add_paragraph(paragraph);
    }

    fn format(&self, text: &str) -> Vec<TextRun> {
        if self.options.normalize_symbols {
            format_inline(&normalize_symbols(text))
        } else {
            format_inline(text)
        }
    }
}

/// The inner text of a `*Figure ...*` or `*Table ...*` caption line.
fn caption_text(text: &str) -> Option<&str> {
    if text.starts_with("**") {
        return None;
    }
    let inner = text.strip_prefix('*')?.strip_suffix('*')?;
    let is_caption = inner.starts_with("Figure") || inner.starts_with("Table");
    (is_caption && !inner.is_empty()).then_some(inner)
}

/// Author and contact lines that must not reach reviewers.
fn is_identifying(block: &SourceBlock) -> bool {
    match block {
        SourceBlock::Heading { level: 1, text } => text.contains("Author"),
        SourceBlock::Paragraph(text) | SourceBlock::ListItem { text, .. } => {
            ["Author", "Email", "Phone"].iter().any(|word| text.contains(word))
        }
        _ => false,
    }
}

fn missing_image_paragraph(reference: &str) -> Paragraph {
    let run = TextRun::styled(
        format!("[IMAGE MISSING: {}]", reference),
        TextStyle {
            color: Some(MISSING_IMAGE_COLOR.to_string()),
            ..Default::default()
        },
    );
    Paragraph::with_runs(vec![run])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(text: &str, options: &ParseOptions) -> Assembly {
        DocumentAssembler::new(options).assemble(&SourceDocument::from_text(text))
    }

    fn paragraph_texts(doc: &Document) -> Vec<String> {
        doc.blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .map(Paragraph::plain_text)
            .collect()
    }

    #[test]
    fn test_heading_page_breaks() {
        let out = assemble("# Title\n\n## Intro\n\nBody\n\n### Detail", &ParseOptions::default());
        let blocks = &out.document.blocks;
        assert!(blocks[0].is_heading());
        assert_eq!(blocks[0].as_paragraph().unwrap().style.alignment, Alignment::Center);
        assert_eq!(blocks[1], Block::PageBreak);
        assert_eq!(blocks[2].as_paragraph().unwrap().heading_level(), Some(2));
        assert_eq!(blocks[4].as_paragraph().unwrap().heading_level(), Some(3));
        assert_eq!(out.stats.page_breaks, 1);
        assert_eq!(out.document.metadata.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_page_break_level_disabled() {
        let options = ParseOptions::new().with_page_break_level(None);
        let out = assemble("## Intro\n\n## Methods", &options);
        assert!(!out.document.blocks.contains(&Block::PageBreak));
    }

    #[test]
    fn test_inline_table_with_title() {
        let text = "**Table 1: Prevalence**\n\n| Gene | N |\n|---|---|\n| KPC | 12 |\nAfter.";
        let out = assemble(text, &ParseOptions::default());
        let blocks = &out.document.blocks;

        assert_eq!(blocks.len(), 3);
        let title = blocks[0].as_paragraph().unwrap();
        assert_eq!(title.plain_text(), "Table 1: Prevalence");
        assert!(title.runs[0].style.bold);

        let table = blocks[1].as_table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.title.as_deref(), Some("**Table 1: Prevalence**"));
        assert_eq!(blocks[2].plain_text().as_deref(), Some("After."));
        assert_eq!(out.tables.len(), 1);
    }

    #[test]
    fn test_pending_title_released_without_table() {
        let out = assemble("**Table note** only\nNext paragraph", &ParseOptions::default());
        assert_eq!(paragraph_texts(&out.document), vec!["Table note only", "Next paragraph"]);
        assert_eq!(out.stats.tables, 0);
    }

    #[test]
    fn test_deferred_tables_section() {
        let text = "## Results\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\nText.";
        let options = ParseOptions::new().defer_tables();
        let out = assemble(text, &options);
        let blocks = &out.document.blocks;

        // break, heading, paragraph, break, "Tables", table
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[2].plain_text().as_deref(), Some("Text."));
        assert_eq!(blocks[3], Block::PageBreak);
        let heading = blocks[4].as_paragraph().unwrap();
        assert_eq!(heading.plain_text(), "Tables");
        assert_eq!(heading.heading_level(), Some(1));
        assert!(blocks[5].as_table().unwrap().header().is_some());
    }

    #[test]
    fn test_source_tables_section_skipped_when_deferred() {
        let text = "## Results\nText.\n## Tables\n| old | table |\nOld text.\n## References\n1. Ref";
        let out = assemble(text, &ParseOptions::new().defer_tables());
        let texts = paragraph_texts(&out.document);

        assert!(!texts.iter().any(|t| t == "Old text."));
        assert!(texts.iter().any(|t| t == "References"));
        assert!(!texts.iter().any(|t| t == "Tables"));
        assert_eq!(out.stats.tables, 0);
    }

    #[test]
    fn test_deferred_without_tables_adds_no_section() {
        let out = assemble("# Title\n\nBody only.", &ParseOptions::new().defer_tables());
        assert_eq!(paragraph_texts(&out.document), vec!["Title", "Body only."]);
        assert!(!out.document.blocks.contains(&Block::PageBreak));
        assert_eq!(out.stats.page_breaks, 0);
    }

    #[test]
    fn test_custom_tables_heading() {
        let text = "## Results\n| a | b |\n| 1 | 2 |\n## Supplementary Tables\n| old | copy |\n## Tables\nKept.";
        let options = ParseOptions::new()
            .defer_tables()
            .with_tables_heading("Supplementary Tables");
        let out = assemble(text, &options);
        let texts = paragraph_texts(&out.document);

        assert_eq!(out.document.tables().count(), 1);
        assert!(texts.iter().any(|t| t == "Tables"));
        assert!(texts.iter().any(|t| t == "Kept."));
        let generated = out.document.blocks[out.document.blocks.len() - 2]
            .as_paragraph()
            .unwrap();
        assert_eq!(generated.plain_text(), "Supplementary Tables");
        assert_eq!(generated.heading_level(), Some(1));
    }

    #[test]
    fn test_blinding_drops_identifying_lines() {
        let text = "# Title\n# Authors and Affiliations\nJane Doe, Author\nEmail: jd@example.org\n- Phone: 555\nBody.";
        let out = assemble(text, &ParseOptions::new().with_blinding(true));
        assert_eq!(paragraph_texts(&out.document), vec!["Title", "Body."]);

        let out = assemble(text, &ParseOptions::default());
        assert_eq!(paragraph_texts(&out.document).len(), 6);
    }

    #[test]
    fn test_omit_mode_drops_figure_captions() {
        let options = ParseOptions::new().with_figure_mode(FigureMode::Omit);
        let out = assemble("![Trend](t.png)\n*Figure 1: Trend*\n*Table 1: Kept*\nNext.", &options);
        assert_eq!(paragraph_texts(&out.document), vec!["Table 1: Kept", "Next."]);
    }

    #[test]
    fn test_tables_section_kept_inline() {
        let out = assemble("## Tables\n| a |\n| 1 |", &ParseOptions::default());
        assert_eq!(out.document.tables().count(), 1);
    }

    #[test]
    fn test_caption_line() {
        let out = assemble("*Figure 1: Trend in *K. pneumoniae**", &ParseOptions::default());
        let p = out.document.blocks[0].as_paragraph().unwrap();
        assert!(p.style.caption);
        assert_eq!(p.style.alignment, Alignment::Center);
        assert!(p.runs.iter().all(|r| r.style.italic && r.style.font_size == Some(10.0)));

        let out = assemble("*Note: preliminary*", &ParseOptions::default());
        assert!(!out.document.blocks[0].as_paragraph().unwrap().style.caption);
    }

    #[test]
    fn test_list_items() {
        let out = assemble("- one\n2. two", &ParseOptions::default());
        let first = out.document.blocks[0].as_paragraph().unwrap();
        let second = out.document.blocks[1].as_paragraph().unwrap();
        assert_eq!(first.style.list_info, Some(ListInfo::bullet()));
        assert_eq!(second.style.list_info, Some(ListInfo::numbered(2)));
        assert_eq!(out.stats.list_items, 2);
    }

    #[test]
    fn test_missing_image_is_non_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = ParseOptions::new().with_base_dir(dir.path());
        let out = assemble("![Fig](nope.png)\nNext line.", &options);

        let placeholder = out.document.blocks[0].as_paragraph().unwrap();
        assert_eq!(placeholder.plain_text(), "[IMAGE MISSING: nope.png]");
        assert_eq!(placeholder.runs[0].style.color.as_deref(), Some("#FF0000"));
        assert_eq!(out.document.blocks[1].plain_text().as_deref(), Some("Next line."));
        assert_eq!(out.stats.missing_images, vec!["nope.png".to_string()]);
        assert_eq!(out.figures.len(), 1);
        assert!(out.figures[0].path.is_none());
    }

    #[test]
    fn test_placeholder_and_omit_modes() {
        let options = ParseOptions::new().with_figure_mode(FigureMode::Placeholder);
        let out = assemble("![Resistance trend](fig.png)", &options);
        let p = out.document.blocks[0].as_paragraph().unwrap();
        assert_eq!(p.plain_text(), "[INSERT FIGURE HERE: Resistance trend]");
        assert!(p.runs[0].style.bold);

        let options = ParseOptions::new().with_figure_mode(FigureMode::Omit);
        let out = assemble("![Resistance trend](fig.png)", &options);
        assert!(out.document.is_empty());
        assert_eq!(out.figures.len(), 1);
    }

    #[test]
    fn test_blank_line_spacing() {
        let options = ParseOptions::new().with_blank_line_spacing(true);
        let out = assemble("\nOne\n\nTwo", &options);
        assert_eq!(out.document.blocks.len(), 3);

        let out = assemble("\nOne\n\nTwo", &ParseOptions::default());
        assert_eq!(out.document.blocks.len(), 2);
    }

    #[test]
    fn test_symbol_normalization() {
        let options = ParseOptions::new().with_symbol_normalization(true);
        let out = assemble("The model R-squared was low.", &options);
        assert_eq!(paragraph_texts(&out.document), vec!["The model R² was low."]);
    }

    #[test]
    fn test_table_at_end_of_stream() {
        let out = assemble("| a | b |\n| 1 | 2 |", &ParseOptions::default());
        assert_eq!(out.document.tables().count(), 1);
    }
}
