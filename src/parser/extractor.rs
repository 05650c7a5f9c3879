//! Glyph extractor using lopdf.

use std::collections::btree_map;
use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, ObjectId};

use crate::error::{Error, Result};
use crate::model::Page;

use super::layout::LayoutAnalyzer;
use super::options::{ErrorMode, ExtractOptions};

/// How far into the input the `%PDF-` header may appear.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Path reported when a reader fails.
const STREAM_INPUT: &str = "<stream>";

/// Positioned-glyph extractor for a loaded PDF document.
pub struct GlyphExtractor {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl GlyphExtractor {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| Error::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ExtractOptions::default())
    }

    /// Load a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        options.validate()?;

        if !has_pdf_header(data) {
            return Err(Error::ExtractionFailed(
                "input does not start with a PDF header".to_string(),
            ));
        }

        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; extracted text may be unreadable");
        }

        log::debug!(
            "Loaded PDF {} with {} pages",
            doc.version,
            doc.get_pages().len()
        );
        Ok(Self { doc, options })
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ExtractOptions::default())
    }

    /// Load a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ExtractOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|source| Error::InputNotFound {
                path: STREAM_INPUT.into(),
                source,
            })?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// PDF version string from the header.
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Options this extractor was built with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Lazily extract pages in document order.
    pub fn pages(&self) -> Pages<'_> {
        Pages {
            analyzer: LayoutAnalyzer::new(&self.doc, self.options),
            error_mode: self.options.error_mode,
            inner: self.doc.get_pages().into_iter(),
        }
    }

    /// Extract every page at once.
    pub fn extract_all(&self) -> Result<Vec<Page>> {
        self.pages().collect()
    }
}

/// Iterator over extracted pages, produced by [`GlyphExtractor::pages`].
pub struct Pages<'a> {
    analyzer: LayoutAnalyzer<'a>,
    error_mode: ErrorMode,
    inner: btree_map::IntoIter<u32, ObjectId>,
}

impl Iterator for Pages<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let (page_num, page_id) = self.inner.next()?;
        match self.analyzer.analyze_page(page_num, page_id) {
            Ok(page) => Some(Ok(page)),
            Err(e) if self.error_mode == ErrorMode::Lenient => {
                log::warn!("Failed to extract text from page {}: {}", page_num, e);
                Some(Ok(self.analyzer.blank_page(page_num, page_id)))
            }
            Err(e) => Some(Err(e)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Pages<'_> {}

fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}
