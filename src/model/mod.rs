//! Glyph model types shared by extraction, noising and re-rendering.
//!
//! Everything here is transient: a [`Page`] is built once during extraction,
//! consumed once by the pipeline, then dropped.

mod glyph;
mod page;

pub use glyph::{GlyphRecord, TextLine};
pub use page::Page;
