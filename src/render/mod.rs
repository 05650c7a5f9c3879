//! Re-rendering of remapped glyphs into a new PDF document.

mod canvas;
mod fonts;
mod options;

pub use canvas::{DrawnGlyph, PdfCanvas};
pub use fonts::{win_ansi_byte, EncodedGlyph, FontTable, OutputFont, StandardFont, UNICODE_FALLBACK_FONT};
pub use options::{PageSize, PageSizePolicy, RenderOptions};
