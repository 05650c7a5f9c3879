//! Glyph-level types.

use serde::{Deserialize, Serialize};

/// One extracted character occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRecord {
    /// The character as rendered
    pub character: char,

    /// Left edge in page units, origin at the page's left side
    pub x: f32,

    /// Top-down baseline position: `page_height - baseline_y`
    pub y: f32,

    /// Source font name (may not exist in the output font table)
    pub font_name: String,

    /// Effective font size in points
    pub font_size: f32,
}

impl GlyphRecord {
    /// Create a new glyph record.
    pub fn new(
        character: char,
        x: f32,
        y: f32,
        font_name: impl Into<String>,
        font_size: f32,
    ) -> Self {
        Self {
            character,
            x,
            y,
            font_name: font_name.into(),
            font_size,
        }
    }

    /// Check that both coordinates are finite.
    ///
    /// Records failing this check are skipped by the renderer.
    pub fn has_finite_position(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Glyphs sharing one layout line, ordered left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// The glyphs in this line
    pub glyphs: Vec<GlyphRecord>,
}

impl TextLine {
    /// Create a line from already ordered glyphs.
    pub fn new(glyphs: Vec<GlyphRecord>) -> Self {
        Self { glyphs }
    }

    /// Plain text of the line, exactly one char per glyph.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.character).collect()
    }

    /// Number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Check if the line has no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
