//! PDF glyph extraction module.

mod extractor;
pub(crate) mod font;
mod layout;
mod options;

pub use extractor::{GlyphExtractor, Pages};
pub use layout::LayoutAnalyzer;
pub use options::{ErrorMode, ExtractOptions};
