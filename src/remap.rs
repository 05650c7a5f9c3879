//! Pairing of noised text with original glyph slots.
//!
//! Glyph `i` receives noised character `i`. A noised line is usually longer
//! than its glyph list; the extra characters have no slot and are dropped.

use std::iter::Zip;
use std::slice;

use crate::model::GlyphRecord;

/// A line's glyphs paired with the characters to draw in their place.
#[derive(Debug, Clone, PartialEq)]
pub struct RemappedLine<'a> {
    glyphs: &'a [GlyphRecord],
    chars: Vec<Option<char>>,
    dropped: usize,
}

impl<'a> RemappedLine<'a> {
    /// Iterate over `(glyph, replacement)` pairs in glyph order.
    pub fn iter(&self) -> Zip<slice::Iter<'a, GlyphRecord>, slice::Iter<'_, Option<char>>> {
        self.glyphs.iter().zip(self.chars.iter())
    }

    /// Number of glyph slots.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Check if the line has no glyph slots.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Number of slots that received a character.
    pub fn drawn_count(&self) -> usize {
        self.chars.iter().filter(|c| c.is_some()).count()
    }

    /// Number of slots left blank.
    pub fn blank_count(&self) -> usize {
        self.len() - self.drawn_count()
    }

    /// Number of noised characters that had no glyph slot.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Pair `glyphs` with the characters of `noised`, position by position.
pub fn remap<'a>(noised: &str, glyphs: &'a [GlyphRecord]) -> RemappedLine<'a> {
    let mut source = noised.chars();
    let chars: Vec<Option<char>> = glyphs.iter().map(|_| source.next()).collect();
    let dropped = source.count();

    RemappedLine {
        glyphs,
        chars,
        dropped,
    }
}
