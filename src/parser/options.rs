//! Extraction options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for glyph extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Baseline tolerance for joining glyphs into one line, as a fraction of font size
    pub line_overlap: f32,

    /// Horizontal gap that starts a new line, as a multiple of font size
    pub char_margin: f32,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (pages with broken content come out blank).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the baseline tolerance.
    pub fn with_line_overlap(mut self, overlap: f32) -> Self {
        self.line_overlap = overlap;
        self
    }

    /// Set the horizontal gap that splits a line.
    pub fn with_char_margin(mut self, margin: f32) -> Self {
        self.char_margin = margin;
        self
    }

    /// Reject values the layout pass cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.line_overlap.is_finite() || self.line_overlap < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "line_overlap must be a non-negative number, got {}",
                self.line_overlap
            )));
        }
        if !self.char_margin.is_finite() || self.char_margin <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "char_margin must be a positive number, got {}",
                self.char_margin
            )));
        }
        Ok(())
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            line_overlap: 0.3,
            char_margin: 2.0,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Fail on any page error
    #[default]
    Strict,
    /// Emit the page without text and continue
    Lenient,
}
