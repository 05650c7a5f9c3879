//! Page-level types.

use super::TextLine;
use serde::{Deserialize, Serialize};

/// A single extracted page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points, used to flip glyph coordinates
    pub height: f32,

    /// Text lines in reading order
    pub lines: Vec<TextLine>,
}

impl Page {
    /// Create a new page with the given dimensions and no text.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            lines: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0) // 8.5 * 72, 11 * 72
    }

    /// Add a line to the page.
    pub fn add_line(&mut self, line: TextLine) {
        self.lines.push(line);
    }

    /// Total number of glyphs on the page.
    pub fn glyph_count(&self) -> usize {
        self.lines.iter().map(TextLine::len).sum()
    }

    /// Plain text of the page, one line per row.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the page carries no text.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(TextLine::is_empty)
    }

    /// Convert a bottom-up baseline to the top-down coordinate stored in glyphs.
    pub fn flip_y(&self, baseline_y: f32) -> f32 {
        self.height - baseline_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GlyphRecord;

    #[test]
    fn test_page_new() {
        let page = Page::new(1, 612.0, 792.0);
        assert_eq!(page.number, 1);
        assert_eq!(page.width, 612.0);
        assert_eq!(page.height, 792.0);
        assert!(page.is_empty());
        assert_eq!(page.glyph_count(), 0);
    }

    #[test]
    fn test_flip_y() {
        let page = Page::letter(1);
        assert_eq!(page.flip_y(700.0), 92.0);
        assert_eq!(page.flip_y(0.0), 792.0);
    }

    #[test]
    fn test_plain_text() {
        let mut page = Page::letter(1);
        page.add_line(TextLine::new(vec![GlyphRecord::new('A', 0.0, 10.0, "F", 12.0)]));
        page.add_line(TextLine::new(vec![GlyphRecord::new('B', 0.0, 30.0, "F", 12.0)]));
        assert_eq!(page.plain_text(), "A\nB");
        assert_eq!(page.glyph_count(), 2);
        assert!(!page.is_empty());
    }
}
