//! Extract → noise → remap → re-render pipeline.

use std::io::{Read, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::noise::{NoiseInjector, SubstituteAlphabet};
use crate::parser::{ExtractOptions, GlyphExtractor};
use crate::remap::remap;
use crate::render::{OutputFont, PdfCanvas, RenderOptions};

/// Options for a full obfuscation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObfuscateOptions {
    /// Probability of inserting a substitute after each character
    pub noise_level: f64,

    /// Characters substitutes are drawn from
    pub alphabet: SubstituteAlphabet,

    /// Seed for reproducible runs; unseeded when `None`
    pub seed: Option<u64>,

    /// Extraction options
    pub extract: ExtractOptions,

    /// Rendering options
    pub render: RenderOptions,
}

impl ObfuscateOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the noise level.
    pub fn with_noise_level(mut self, level: f64) -> Self {
        self.noise_level = level;
        self
    }

    /// Set the substitute alphabet.
    pub fn with_alphabet(mut self, alphabet: SubstituteAlphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Seed the random generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the extraction options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Set the rendering options.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Check every option before any work starts.
    pub fn validate(&self) -> Result<()> {
        NoiseInjector::new(self.noise_level, self.alphabet)?;
        self.extract.validate()?;
        self.render.validate()
    }
}

impl Default for ObfuscateOptions {
    fn default() -> Self {
        Self {
            noise_level: 0.01,
            alphabet: SubstituteAlphabet::default(),
            seed: None,
            extract: ExtractOptions::default(),
            render: RenderOptions::default(),
        }
    }
}

/// A glyph the renderer skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphFailure {
    pub page: u32,
    pub line: usize,
    pub index: usize,
    pub character: char,
    pub reason: String,
}

/// Statistics of one obfuscation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObfuscationReport {
    pub pages: usize,
    pub lines: usize,
    pub glyphs_extracted: usize,
    pub glyphs_drawn: usize,
    /// Glyph slots with no noised character left to draw
    pub blank_slots: usize,
    pub noise_inserted: usize,
    /// Noised characters past the last glyph of their line
    pub noise_dropped: usize,
    /// Glyphs drawn with the default font because their font was unknown
    pub fallback_font_uses: usize,
    pub unicode_fallback_uses: usize,
    pub failures: Vec<GlyphFailure>,
    pub output_bytes: usize,
}

/// Runs the obfuscation pipeline with fixed options.
#[derive(Debug, Clone)]
pub struct Obfuscator {
    options: ObfuscateOptions,
    injector: NoiseInjector,
}

impl Obfuscator {
    /// Create an obfuscator, rejecting invalid options.
    pub fn new(options: ObfuscateOptions) -> Result<Self> {
        options.validate()?;
        let injector = NoiseInjector::new(options.noise_level, options.alphabet)?;
        Ok(Self { options, injector })
    }

    /// Options in use.
    pub fn options(&self) -> &ObfuscateOptions {
        &self.options
    }

    /// Obfuscate a PDF file into `sink`.
    pub fn obfuscate_file<P: AsRef<Path>, W: Write>(
        &self,
        path: P,
        sink: &mut W,
    ) -> Result<ObfuscationReport> {
        let extractor = GlyphExtractor::open_with_options(path, self.options.extract)?;
        self.run_seeded(&extractor, sink)
    }

    /// Obfuscate PDF bytes into `sink`.
    pub fn obfuscate_bytes<W: Write>(&self, data: &[u8], sink: &mut W) -> Result<ObfuscationReport> {
        let extractor = GlyphExtractor::from_bytes_with_options(data, self.options.extract)?;
        self.run_seeded(&extractor, sink)
    }

    /// Obfuscate a PDF read from `reader` into `sink`.
    pub fn obfuscate_reader<R: Read, W: Write>(
        &self,
        reader: R,
        sink: &mut W,
    ) -> Result<ObfuscationReport> {
        let extractor = GlyphExtractor::from_reader_with_options(reader, self.options.extract)?;
        self.run_seeded(&extractor, sink)
    }

    /// Obfuscate PDF bytes with a caller-supplied random generator.
    ///
    /// The configured seed is ignored.
    pub fn obfuscate_bytes_with_rng<R: Rng + ?Sized, W: Write>(
        &self,
        data: &[u8],
        sink: &mut W,
        rng: &mut R,
    ) -> Result<ObfuscationReport> {
        let extractor = GlyphExtractor::from_bytes_with_options(data, self.options.extract)?;
        self.run(&extractor, sink, rng)
    }

    fn run_seeded<W: Write>(
        &self,
        extractor: &GlyphExtractor,
        sink: &mut W,
    ) -> Result<ObfuscationReport> {
        match self.options.seed {
            Some(seed) => self.run(extractor, sink, &mut StdRng::seed_from_u64(seed)),
            None => self.run(extractor, sink, &mut rand::rng()),
        }
    }

    fn run<R: Rng + ?Sized, W: Write>(
        &self,
        extractor: &GlyphExtractor,
        sink: &mut W,
        rng: &mut R,
    ) -> Result<ObfuscationReport> {
        let mut canvas = PdfCanvas::new(self.options.render.clone());
        let mut report = ObfuscationReport::default();

        for page in extractor.pages() {
            let page = page?;
            let size = self.options.render.page_size.resolve(page.width, page.height);
            canvas.begin_page(size)?;

            for (line_index, line) in page.lines.iter().enumerate() {
                let noised = self.injector.inject(&line.text(), rng);
                let remapped = remap(&noised, &line.glyphs);

                report.lines += 1;
                report.glyphs_extracted += line.len();
                report.noise_inserted += noised.chars().count().saturating_sub(line.len());
                report.noise_dropped += remapped.dropped();
                report.blank_slots += remapped.blank_count();

                for (index, (glyph, replacement)) in remapped.iter().enumerate() {
                    let Some(ch) = *replacement else {
                        continue;
                    };
                    match canvas.draw_glyph(glyph, ch) {
                        Ok(drawn) => {
                            report.glyphs_drawn += 1;
                            if drawn.substituted {
                                report.fallback_font_uses += 1;
                            }
                            if drawn.font == OutputFont::UnicodeFallback {
                                report.unicode_fallback_uses += 1;
                            }
                        }
                        Err(err) => {
                            let reason = err.to_string();
                            log::warn!(
                                "Page {} line {} glyph {}: {}",
                                page.number,
                                line_index,
                                index,
                                Error::from(err)
                            );
                            report.failures.push(GlyphFailure {
                                page: page.number,
                                line: line_index,
                                index,
                                character: ch,
                                reason,
                            });
                        }
                    }
                }
            }

            canvas.show_page()?;
            report.pages += 1;
            log::debug!(
                "Page {}: {} lines, {} glyphs",
                page.number,
                page.lines.len(),
                page.glyph_count()
            );
        }

        report.output_bytes = canvas.save(sink)?;

        log::info!(
            "Obfuscated {} pages: {} of {} glyphs drawn, {} noise characters inserted",
            report.pages,
            report.glyphs_drawn,
            report.glyphs_extracted,
            report.noise_inserted
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ObfuscateOptions::default();
        assert_eq!(options.noise_level, 0.01);
        assert_eq!(options.seed, None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let result = Obfuscator::new(ObfuscateOptions::new().with_noise_level(2.0));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let render = RenderOptions::new().with_default_font_size(-4.0);
        let result = Obfuscator::new(ObfuscateOptions::new().with_render_options(render));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_garbage_input_leaves_sink_empty() {
        let obfuscator = Obfuscator::new(ObfuscateOptions::default()).unwrap();
        let mut sink = Vec::new();
        let result = obfuscator.obfuscate_bytes(b"not a pdf at all", &mut sink);
        assert!(matches!(result, Err(Error::ExtractionFailed(_))));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_options_serde() {
        let options = ObfuscateOptions::new().with_seed(9).with_noise_level(0.5);
        let json = serde_json::to_string(&options).unwrap();
        let parsed: ObfuscateOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
