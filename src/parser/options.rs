//! Parsing options and configuration.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Options controlling how manuscript markup is assembled into a document.
///
/// Replaces the hardcoded base/output/figure directories of ad hoc generator
/// scripts: everything the assembler needs to know is passed in here.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Directory that relative image references are resolved against
    pub base_dir: Option<PathBuf>,

    /// Fallback directories searched for an image by file name
    pub image_search_paths: Vec<PathBuf>,

    /// Collect tables into a trailing section instead of emitting them inline
    pub defer_tables: bool,

    /// Title of the trailing tables section (also the source section skipped in deferred mode)
    pub tables_heading: String,

    /// Heading level that forces a page break before it (None = never)
    pub page_break_level: Option<u8>,

    /// How image references are rendered in the main text
    pub figure_mode: FigureMode,

    /// Display width of embedded images in inches
    pub image_width: f32,

    /// Font size of figure/table captions in points
    pub caption_font_size: f32,

    /// Recognize `- item` and `1. item` lines as list items
    pub recognize_lists: bool,

    /// Emit an empty spacer paragraph for each blank source line
    pub blank_line_spacing: bool,

    /// Rewrite ASCII formula spellings (R-squared, beta_0) to symbols
    pub normalize_symbols: bool,

    /// Drop author, email and phone lines for peer review
    pub blinded: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base directory for relative image paths.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Append a fallback image search directory.
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_search_paths.push(dir.into());
        self
    }

    /// Replace the fallback image search directories.
    pub fn with_search_paths<P: Into<PathBuf>>(mut self, dirs: impl IntoIterator<Item = P>) -> Self {
        self.image_search_paths = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable deferred tables.
    pub fn with_deferred_tables(mut self, defer: bool) -> Self {
        self.defer_tables = defer;
        self
    }

    /// Collect all tables into a trailing section.
    pub fn defer_tables(self) -> Self {
        self.with_deferred_tables(true)
    }

    /// Set the title of the trailing tables section.
    pub fn with_tables_heading(mut self, heading: impl Into<String>) -> Self {
        self.tables_heading = heading.into();
        self
    }

    /// Set the heading level that starts a new page.
    pub fn with_page_break_level(mut self, level: Option<u8>) -> Self {
        self.page_break_level = level;
        self
    }

    /// Set the figure mode.
    pub fn with_figure_mode(mut self, mode: FigureMode) -> Self {
        self.figure_mode = mode;
        self
    }

    /// Set the display width of images in inches.
    pub fn with_image_width(mut self, inches: f32) -> Self {
        self.image_width = inches;
        self
    }

    /// Set the caption font size in points.
    pub fn with_caption_font_size(mut self, points: f32) -> Self {
        self.caption_font_size = points;
        self
    }

    /// Enable or disable list recognition.
    pub fn with_lists(mut self, recognize: bool) -> Self {
        self.recognize_lists = recognize;
        self
    }

    /// Enable or disable spacer paragraphs for blank lines.
    pub fn with_blank_line_spacing(mut self, spacing: bool) -> Self {
        self.blank_line_spacing = spacing;
        self
    }

    /// Enable or disable formula symbol normalization.
    pub fn with_symbol_normalization(mut self, normalize: bool) -> Self {
        self.normalize_symbols = normalize;
        self
    }

    /// Enable or disable blinding for peer review.
    pub fn with_blinding(mut self, blinded: bool) -> Self {
        self.blinded = blinded;
        self
    }

    /// Check that numeric options are in range.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.page_break_level {
            if !(1..=3).contains(&level) {
                return Err(Error::InvalidOption(format!(
                    "page break level must be 1-3, got {}",
                    level
                )));
            }
        }
        if !self.image_width.is_finite() || self.image_width <= 0.0 {
            return Err(Error::InvalidOption(format!(
                "image width must be positive, got {}",
                self.image_width
            )));
        }
        if !self.caption_font_size.is_finite() || self.caption_font_size <= 0.0 {
            return Err(Error::InvalidOption(format!(
                "caption font size must be positive, got {}",
                self.caption_font_size
            )));
        }
        Ok(())
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            image_search_paths: Vec::new(),
            defer_tables: false,
            tables_heading: "Tables".to_string(),
            page_break_level: Some(2),
            figure_mode: FigureMode::Inline,
            image_width: 6.0,
            caption_font_size: 10.0,
            recognize_lists: true,
            blank_line_spacing: false,
            normalize_symbols: false,
            blinded: false,
        }
    }
}

/// How image references are rendered in the main text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FigureMode {
    /// Embed the image with its caption
    #[default]
    Inline,
    /// Emit an `[INSERT FIGURE HERE: ...]` marker (figures go to a companion document)
    Placeholder,
    /// Drop image references and their `*Figure ...*` captions from the main text
    Omit,
}
