//! # noisepdf
//!
//! Re-render PDF documents with a perturbed text layer.
//!
//! Every character of the input is located on its page, random substitute
//! characters are injected into each line of text, and a new PDF is drawn
//! from scratch with the noised characters placed on the original glyph
//! positions. The result reads almost the same to a person while defeating
//! naive copy-and-paste and text-mining.
//!
//! ## Quick Start
//!
//! ```no_run
//! use noisepdf::{ObfuscateOptions, Obfuscator};
//!
//! fn main() -> noisepdf::Result<()> {
//!     let obfuscator = Obfuscator::new(ObfuscateOptions::new().with_noise_level(0.05))?;
//!
//!     let mut output = std::fs::File::create("obfuscated.pdf")?;
//!     let report = obfuscator.obfuscate_file("document.pdf", &mut output)?;
//!     println!("{} glyphs drawn on {} pages", report.glyphs_drawn, report.pages);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`parser`]: positioned glyphs grouped into lines, in reading order
//! - [`noise`]: probabilistic character insertion
//! - [`remap`]: pairing of noised text with the original glyph slots
//! - [`render`]: a top-down PDF canvas with Standard 14 and CJK fonts
//! - [`pipeline`]: the orchestrator tying the stages together
//! - [`staging`]: temporary-file handling for uploads

pub mod error;
pub mod model;
pub mod noise;
pub mod parser;
pub mod pipeline;
pub mod remap;
pub mod render;
pub mod staging;

// Re-export commonly used types
pub use error::{Error, GlyphDrawError, Result};
pub use model::{GlyphRecord, Page, TextLine};
pub use noise::{add_noise, NoiseInjector, SubstituteAlphabet};
pub use parser::{ErrorMode, ExtractOptions, GlyphExtractor};
pub use pipeline::{GlyphFailure, ObfuscateOptions, ObfuscationReport, Obfuscator};
pub use remap::{remap, RemappedLine};
pub use render::{PageSize, PageSizePolicy, PdfCanvas, RenderOptions, StandardFont};
pub use staging::{ObfuscatedDownload, StagedUpload};

use std::io::Write;
use std::path::Path;

/// Obfuscate a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// let mut output = Vec::new();
/// noisepdf::obfuscate_file("document.pdf", &mut output).unwrap();
/// ```
pub fn obfuscate_file<P: AsRef<Path>, W: Write>(path: P, sink: &mut W) -> Result<ObfuscationReport> {
    Obfuscator::new(ObfuscateOptions::default())?.obfuscate_file(path, sink)
}

/// Obfuscate PDF bytes with default options.
pub fn obfuscate_bytes<W: Write>(data: &[u8], sink: &mut W) -> Result<ObfuscationReport> {
    Obfuscator::new(ObfuscateOptions::default())?.obfuscate_bytes(data, sink)
}

/// Extract the positioned glyphs of every page.
///
/// # Example
///
/// ```no_run
/// let pages = noisepdf::extract_pages("document.pdf").unwrap();
/// for page in &pages {
///     println!("{}", page.plain_text());
/// }
/// ```
pub fn extract_pages<P: AsRef<Path>>(path: P) -> Result<Vec<Page>> {
    GlyphExtractor::open(path)?.extract_all()
}
