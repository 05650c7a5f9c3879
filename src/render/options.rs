//! Rendering options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::fonts::StandardFont;

/// Options for re-rendering glyphs into a new document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// How output pages are sized
    pub page_size: PageSizePolicy,

    /// Font used when the original font has no Latin counterpart
    pub default_font: StandardFont,

    /// Size used when the original size is missing or invalid
    pub default_font_size: f32,

    /// Text fill color, RGB in [0, 1]
    pub fill_color: [f32; 3],

    /// Draw characters outside WinAnsi with a Unicode CID font
    pub unicode_fallback: bool,

    /// Compress content streams
    pub compress: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size policy.
    pub fn with_page_size(mut self, policy: PageSizePolicy) -> Self {
        self.page_size = policy;
        self
    }

    /// Set the default font.
    pub fn with_default_font(mut self, font: StandardFont) -> Self {
        self.default_font = font;
        self
    }

    /// Set the default font size.
    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    /// Set the text fill color.
    pub fn with_fill_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.fill_color = [r, g, b];
        self
    }

    /// Enable or disable the Unicode fallback font.
    pub fn with_unicode_fallback(mut self, enabled: bool) -> Self {
        self.unicode_fallback = enabled;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Reject values the canvas cannot draw with.
    pub fn validate(&self) -> Result<()> {
        if !self.default_font_size.is_finite() || self.default_font_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "default font size must be positive, got {}",
                self.default_font_size
            )));
        }
        if self
            .fill_color
            .iter()
            .any(|c| !c.is_finite() || !(0.0..=1.0).contains(c))
        {
            return Err(Error::InvalidConfig(format!(
                "fill color components must be within [0, 1], got {:?}",
                self.fill_color
            )));
        }
        if let PageSizePolicy::Fixed(size) = self.page_size {
            size.validate()?;
        }
        Ok(())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: PageSizePolicy::default(),
            default_font: StandardFont::Helvetica,
            default_font_size: 12.0,
            fill_color: [0.0, 0.0, 0.0],
            unicode_fallback: true,
            compress: true,
        }
    }
}

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US Letter, 8.5 x 11 in.
    pub const LETTER: PageSize = PageSize::new(612.0, 792.0);

    /// ISO A4, 210 x 297 mm.
    pub const A4: PageSize = PageSize::new(595.28, 841.89);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn validate(&self) -> Result<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "page size must be positive, got {}x{}",
                self.width, self.height
            )))
        }
    }
}

/// How output page sizes are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSizePolicy {
    /// Every page gets the same size
    Fixed(PageSize),
    /// Each page copies its input page's size
    MatchInput,
}

impl PageSizePolicy {
    /// Size of the output page for an input page of `width` x `height`.
    ///
    /// Unusable input dimensions fall back to Letter.
    pub fn resolve(&self, width: f32, height: f32) -> PageSize {
        match self {
            PageSizePolicy::Fixed(size) => *size,
            PageSizePolicy::MatchInput => {
                let size = PageSize::new(width, height);
                if size.validate().is_ok() {
                    size
                } else {
                    PageSize::LETTER
                }
            }
        }
    }

    /// Parse a policy name ("letter", "a4", "match").
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Ok(PageSizePolicy::Fixed(PageSize::LETTER)),
            "a4" => Ok(PageSizePolicy::Fixed(PageSize::A4)),
            "match" | "match-input" => Ok(PageSizePolicy::MatchInput),
            other => Err(format!("Unknown page size: {}", other)),
        }
    }
}

impl Default for PageSizePolicy {
    fn default() -> Self {
        PageSizePolicy::Fixed(PageSize::LETTER)
    }
}
