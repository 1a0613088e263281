//! # manudoc
//!
//! Manuscript markup to DOCX conversion.
//!
//! This library reads the restricted markdown dialect research manuscripts
//! are drafted in (headings, paragraphs with bold/italic/citation markers,
//! pipe tables, image references, lists) and writes submission-ready Word
//! documents.
//!
//! ## Quick Start
//!
//! ```no_run
//! use manudoc::{parse_file, render};
//!
//! fn main() -> manudoc::Result<()> {
//!     let doc = parse_file("manuscript.md")?;
//!
//!     let options = render::RenderOptions::default();
//!     render::write_docx(&doc, &options, "manuscript.docx")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Inline formatting**: `**bold**`, `*italic*` and `[3,5]` superscript citations
//! - **Tables**: pipe tables with bold header rows, inline or collected at the end
//! - **Figures**: embedded images, placeholder markers or a separate figures document
//! - **Deterministic output**: identical input gives byte-identical packages
//! - **Graceful degradation**: missing images become visible placeholders

pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, ListInfo, ListMarker, Metadata, Paragraph, ParagraphStyle,
    Resource, Table, TableCell, TableRow, TextRun, TextStyle,
};
pub use parser::{Assembly, AssemblyStats, FigureMode, FigureRef, ParseOptions, SourceDocument};
pub use render::{JsonFormat, PageSize, RenderOptions};

use parser::DocumentAssembler;
use std::path::{Path, PathBuf};

/// Parse a manuscript file with default options.
///
/// Relative image references are resolved against the file's directory.
///
/// # Example
///
/// ```no_run
/// use manudoc::parse_file;
///
/// let doc = parse_file("manuscript.md").unwrap();
/// println!("Blocks: {}", doc.blocks.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Parse a manuscript file with custom options.
///
/// # Example
///
/// ```no_run
/// use manudoc::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new()
///     .defer_tables()
///     .with_search_path("outputs/figures");
/// let doc = parse_file_with_options("manuscript.md", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    Ok(assemble_file(path.as_ref(), options)?.document)
}

/// Parse manuscript markup held in memory.
pub fn parse_str(text: &str, options: ParseOptions) -> Result<Document> {
    Ok(parse_str_with_stats(text, options)?.document)
}

/// Parse manuscript markup and keep the assembly by-products.
///
/// Besides the document, the result carries emission counts, every image
/// reference and every table, which the companion documents are built from.
pub fn parse_str_with_stats(text: &str, options: ParseOptions) -> Result<Assembly> {
    options.validate()?;
    let source = SourceDocument::from_text(text);
    Ok(DocumentAssembler::new(&options).assemble(&source))
}

/// Convert a manuscript file to a DOCX file with default options.
///
/// # Example
///
/// ```no_run
/// manudoc::convert_file("manuscript.md", "manuscript.docx").unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    convert_file_with_options(
        input,
        output,
        ParseOptions::default(),
        &RenderOptions::default(),
    )
}

/// Convert a manuscript file to a DOCX file with custom options.
pub fn convert_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    parse_options: ParseOptions,
    render_options: &RenderOptions,
) -> Result<()> {
    let doc = parse_file_with_options(input, parse_options)?;
    render::write_docx(&doc, render_options, output)
}

fn assemble_file(path: &Path, mut options: ParseOptions) -> Result<Assembly> {
    options.validate()?;
    if options.base_dir.is_none() {
        options.base_dir = Some(source_dir(path));
    }
    let source = SourceDocument::from_path(path)?;
    Ok(DocumentAssembler::new(&options).assemble(&source))
}

fn source_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Builder for parsing and converting manuscripts.
///
/// # Example
///
/// ```no_run
/// use manudoc::{FigureMode, Manudoc};
///
/// let result = Manudoc::new()
///     .defer_tables()
///     .with_figure_mode(FigureMode::Placeholder)
///     .with_search_path("outputs/figures")
///     .parse("manuscript.md")?;
/// result.write_docx("Manuscript_Main.docx")?;
/// result.write_figures_docx("Manuscript_Figures.docx")?;
/// # Ok::<(), manudoc::Error>(())
/// ```
pub struct Manudoc {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Manudoc {
    /// Create a new Manudoc builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Replace the parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Collect tables into a trailing section.
    pub fn defer_tables(mut self) -> Self {
        self.parse_options = self.parse_options.defer_tables();
        self
    }

    /// Set the base directory for relative image paths.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.parse_options = self.parse_options.with_base_dir(dir);
        self
    }

    /// Append a fallback image search directory.
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.parse_options = self.parse_options.with_search_path(dir);
        self
    }

    /// Set how image references are rendered.
    pub fn with_figure_mode(mut self, mode: FigureMode) -> Self {
        self.parse_options = self.parse_options.with_figure_mode(mode);
        self
    }

    /// Set the heading level that starts a new page.
    pub fn with_page_break_level(mut self, level: Option<u8>) -> Self {
        self.parse_options = self.parse_options.with_page_break_level(level);
        self
    }

    /// Rewrite ASCII formula spellings to symbols.
    pub fn with_symbol_normalization(mut self) -> Self {
        self.parse_options = self.parse_options.with_symbol_normalization(true);
        self
    }

    /// Drop author and contact lines for peer review.
    pub fn blinded(mut self) -> Self {
        self.parse_options = self.parse_options.with_blinding(true);
        self
    }

    /// Set the font family.
    pub fn with_font(mut self, family: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_font(family);
        self
    }

    /// Set the body font size in points.
    pub fn with_font_size(mut self, points: f32) -> Self {
        self.render_options = self.render_options.with_font_size(points);
        self
    }

    /// Set the line spacing multiplier.
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.render_options = self.render_options.with_line_spacing(spacing);
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.render_options = self.render_options.with_page_size(size);
        self
    }

    /// Parse a manuscript file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<ManudocResult> {
        self.render_options.validate()?;
        let assembly = assemble_file(path.as_ref(), self.parse_options.clone())?;
        Ok(self.wrap(assembly))
    }

    /// Parse manuscript markup held in memory.
    pub fn parse_str(self, text: &str) -> Result<ManudocResult> {
        self.render_options.validate()?;
        let assembly = parse_str_with_stats(text, self.parse_options.clone())?;
        Ok(self.wrap(assembly))
    }

    fn wrap(self, assembly: Assembly) -> ManudocResult {
        ManudocResult {
            assembly,
            parse_options: self.parse_options,
            render_options: self.render_options,
        }
    }
}

impl Default for Manudoc {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a manuscript.
pub struct ManudocResult {
    assembly: Assembly,
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl ManudocResult {
    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.assembly.document
    }

    /// Get the emission counts.
    pub fn stats(&self) -> &AssemblyStats {
        &self.assembly.stats
    }

    /// Get every image reference, in source order.
    pub fn figures(&self) -> &[FigureRef] {
        &self.assembly.figures
    }

    /// Get every table, in source order.
    pub fn tables(&self) -> &[Table] {
        &self.assembly.tables
    }

    /// Render the document as DOCX bytes.
    pub fn to_docx_bytes(&self) -> Result<Vec<u8>> {
        render::to_docx(&self.assembly.document, &self.render_options)
    }

    /// Write the document as a DOCX file.
    pub fn write_docx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        render::write_docx(&self.assembly.document, &self.render_options, path)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.assembly.document, format)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> String {
        render::to_text(&self.assembly.document)
    }

    /// Build the figures-only companion document.
    pub fn figures_document(&self) -> Document {
        parser::figures_document(&self.assembly.figures, &self.parse_options)
    }

    /// Build the tables-only companion document.
    pub fn tables_document(&self) -> Document {
        parser::tables_document(&self.assembly.tables, &self.parse_options)
    }

    /// Build the title page from the document's front matter.
    ///
    /// Parse without blinding for this: blinded documents have the
    /// author and contact lines removed.
    pub fn title_page_document(&self) -> Document {
        parser::title_page_document(&self.assembly.document)
    }

    /// Write the title page as a DOCX file.
    pub fn write_title_page_docx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        render::write_docx(&self.title_page_document(), &self.render_options, path)
    }

    /// Write the figures-only companion document as a DOCX file.
    pub fn write_figures_docx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        render::write_docx(&self.figures_document(), &self.render_options, path)
    }

    /// Write the tables-only companion document as a DOCX file.
    pub fn write_tables_docx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        render::write_docx(&self.tables_document(), &self.render_options, path)
    }

    /// Take the assembly out of the wrapper.
    pub fn into_assembly(self) -> Assembly {
        self.assembly
    }
}
