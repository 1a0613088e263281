//! Rendering options and configuration.

use crate::error::{Error, Result};

/// Options for writing a document package.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Font family for body text and headings
    pub font_family: String,

    /// Body font size in points
    pub font_size: f32,

    /// Line spacing multiplier (2.0 = double spaced)
    pub line_spacing: f32,

    /// Heading colour as six hex digits, without `#`
    pub heading_color: String,

    /// Page size
    pub page_size: PageSize,

    /// Page margin on all sides in inches
    pub margin: f32,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font family.
    pub fn with_font(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the body font size in points.
    pub fn with_font_size(mut self, points: f32) -> Self {
        self.font_size = points;
        self
    }

    /// Set the line spacing multiplier.
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Set the heading colour (`"000000"` or `"#1F3864"`).
    pub fn with_heading_color(mut self, color: impl Into<String>) -> Self {
        let color = color.into();
        self.heading_color = color.trim_start_matches('#').to_string();
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = size;
        self
    }

    /// Set the page margin in inches.
    pub fn with_margin(mut self, inches: f32) -> Self {
        self.margin = inches;
        self
    }

    /// Check that the options describe a printable page.
    pub fn validate(&self) -> Result<()> {
        if self.font_family.trim().is_empty() {
            return Err(Error::InvalidOption("font family must not be empty".to_string()));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(Error::InvalidOption(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !self.line_spacing.is_finite() || self.line_spacing <= 0.0 {
            return Err(Error::InvalidOption(format!(
                "line spacing must be positive, got {}",
                self.line_spacing
            )));
        }
        let hex = self.heading_color.len() == 6
            && self.heading_color.chars().all(|c| c.is_ascii_hexdigit());
        if !hex {
            return Err(Error::InvalidOption(format!(
                "heading color must be six hex digits, got '{}'",
                self.heading_color
            )));
        }
        let (width, _) = self.page_size.inches();
        if !self.margin.is_finite() || self.margin < 0.0 || self.margin * 2.0 >= width {
            return Err(Error::InvalidOption(format!(
                "margin of {} inches does not fit the page",
                self.margin
            )));
        }
        Ok(())
    }

    /// Width between the margins in inches.
    pub fn text_width(&self) -> f32 {
        self.page_size.inches().0 - 2.0 * self.margin
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".to_string(),
            font_size: 12.0,
            line_spacing: 2.0,
            heading_color: "000000".to_string(),
            page_size: PageSize::A4,
            margin: 1.0,
        }
    }
}

/// Page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// 210 x 297 mm
    #[default]
    A4,
    /// 8.5 x 11 in
    Letter,
}

impl PageSize {
    /// Width and height in inches.
    pub fn inches(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (8.27, 11.69),
            PageSize::Letter => (8.5, 11.0),
        }
    }

    /// Width and height in twentieths of a point.
    pub fn twips(&self) -> (u32, u32) {
        match self {
            PageSize::A4 => (11906, 16838),
            PageSize::Letter => (12240, 15840),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_font("Arial")
            .with_font_size(11.0)
            .with_line_spacing(1.5)
            .with_heading_color("#1F3864")
            .with_page_size(PageSize::Letter);

        assert_eq!(options.font_family, "Arial");
        assert_eq!(options.font_size, 11.0);
        assert_eq!(options.heading_color, "1F3864");
        assert_eq!(options.page_size, PageSize::Letter);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_default_render_options() {
        let options = RenderOptions::default();
        assert_eq!(options.font_family, "Times New Roman");
        assert_eq!(options.font_size, 12.0);
        assert_eq!(options.line_spacing, 2.0);
        assert!((options.text_width() - 6.27).abs() < 1e-4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(RenderOptions::new().with_font(" ").validate().is_err());
        assert!(RenderOptions::new().with_font_size(0.0).validate().is_err());
        assert!(RenderOptions::new().with_line_spacing(f32::NAN).validate().is_err());
        assert!(RenderOptions::new().with_heading_color("black").validate().is_err());
        assert!(RenderOptions::new().with_margin(5.0).validate().is_err());
    }
}
