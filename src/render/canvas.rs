//! PDF canvas: positions glyphs on new pages and serializes the document.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, GlyphDrawError, Result};
use crate::model::GlyphRecord;

use super::fonts::{add_latin_font, add_unicode_fallback_font, FontTable, OutputFont};
use super::options::{PageSize, RenderOptions};

/// Producer string written to the document info dictionary.
const PRODUCER: &str = concat!("noisepdf ", env!("CARGO_PKG_VERSION"));

/// How a glyph was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnGlyph {
    pub font: OutputFont,
    /// The default font stood in for an unknown source font
    pub substituted: bool,
}

struct OpenPage {
    size: PageSize,
    operations: Vec<Operation>,
}

/// Document writer with a top-down coordinate system.
///
/// Every page flips its y axis once, so glyph positions measured from the top
/// edge are used as-is and text stays upright.
pub struct PdfCanvas {
    doc: LopdfDocument,
    options: RenderOptions,
    fonts: FontTable,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    font_ids: BTreeMap<String, ObjectId>,
    current: Option<OpenPage>,
}

impl PdfCanvas {
    /// Create an empty canvas.
    pub fn new(options: RenderOptions) -> Self {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        let fonts = FontTable::new(options.default_font, options.unicode_fallback);

        Self {
            doc,
            options,
            fonts,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            font_ids: BTreeMap::new(),
            current: None,
        }
    }

    /// Number of finished pages.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Start a new page, finishing the open one first.
    pub fn begin_page(&mut self, size: PageSize) -> Result<()> {
        if self.current.is_some() {
            self.show_page()?;
        }
        self.current = Some(OpenPage {
            size,
            operations: Vec::new(),
        });
        Ok(())
    }

    /// Draw `ch` at the position and size of `glyph`.
    pub fn draw_glyph(
        &mut self,
        glyph: &GlyphRecord,
        ch: char,
    ) -> std::result::Result<DrawnGlyph, GlyphDrawError> {
        if !glyph.has_finite_position() {
            return Err(GlyphDrawError::NonFiniteCoordinates {
                x: glyph.x,
                y: glyph.y,
            });
        }

        let encoded = self.fonts.encode(&glyph.font_name, ch)?;
        let size = if glyph.font_size.is_finite() && glyph.font_size > 0.0 {
            glyph.font_size
        } else {
            self.options.default_font_size
        };
        let resource = self.register_font(encoded.font);
        let format = encoded.string_format();

        let page = self.open_page();
        page.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(resource.into_bytes()), Object::Real(size)],
            ),
            Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(-1),
                    Object::Real(glyph.x),
                    Object::Real(glyph.y),
                ],
            ),
            Operation::new("Tj", vec![Object::String(encoded.bytes, format)]),
            Operation::new("ET", vec![]),
        ]);

        Ok(DrawnGlyph {
            font: encoded.font,
            substituted: encoded.substituted,
        })
    }

    /// Finish the open page. An empty page is emitted when none is open.
    pub fn show_page(&mut self) -> Result<()> {
        let page = match self.current.take() {
            Some(page) => page,
            None => OpenPage {
                size: self.default_size(),
                operations: Vec::new(),
            },
        };

        let [r, g, b] = self.options.fill_color;
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(-1),
                    Object::Integer(0),
                    Object::Real(page.size.height),
                ],
            ),
            Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
        ];
        operations.extend(page.operations);
        operations.push(Operation::new("Q", vec![]));

        let data = Content { operations }
            .encode()
            .map_err(|e| Error::RenderingFailed(format!("page content: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, data));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.size.width),
                Object::Real(page.size.height),
            ],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Serialize the document into memory.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.current.is_some() {
            self.show_page()?;
        }

        let mut font_dict = Dictionary::new();
        for (name, id) in &self.font_ids {
            font_dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
        }
        self.doc.objects.insert(
            self.resources_id,
            Object::Dictionary(dictionary! { "Font" => font_dict }),
        );

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let created = Utc::now().format("D:%Y%m%d%H%M%S+00'00'").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(created),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);

        if self.options.compress {
            self.doc.compress();
        }

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| Error::RenderingFailed(e.to_string()))?;
        Ok(buffer)
    }

    /// Serialize the document and write it to `sink`. Returns the byte count.
    pub fn save<W: Write>(self, sink: &mut W) -> Result<usize> {
        let buffer = self.finish()?;
        sink.write_all(&buffer)
            .and_then(|_| sink.flush())
            .map_err(|e| Error::RenderingFailed(e.to_string()))?;
        Ok(buffer.len())
    }

    fn default_size(&self) -> PageSize {
        self.options.page_size.resolve(0.0, 0.0)
    }

    fn open_page(&mut self) -> &mut OpenPage {
        let size = self.default_size();
        self.current.get_or_insert_with(|| OpenPage {
            size,
            operations: Vec::new(),
        })
    }

    fn register_font(&mut self, font: OutputFont) -> String {
        let name = font.resource_name();
        if !self.font_ids.contains_key(&name) {
            let id = match font {
                OutputFont::Latin(standard) => add_latin_font(&mut self.doc, standard),
                OutputFont::UnicodeFallback => add_unicode_fallback_font(&mut self.doc),
            };
            self.font_ids.insert(name.clone(), id);
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fonts::StandardFont;
    use crate::render::options::PageSizePolicy;

    fn glyph(c: char, x: f32, y: f32) -> GlyphRecord {
        GlyphRecord::new(c, x, y, "Helvetica", 12.0)
    }

    fn uncompressed() -> RenderOptions {
        RenderOptions::new().with_compression(false)
    }

    #[test]
    fn test_empty_document() {
        let canvas = PdfCanvas::new(uncompressed());
        let bytes = canvas.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = LopdfDocument::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
    }

    #[test]
    fn test_pages_are_counted() {
        let mut canvas = PdfCanvas::new(uncompressed());
        canvas.begin_page(PageSize::LETTER).unwrap();
        canvas.show_page().unwrap();
        canvas.show_page().unwrap();
        canvas.begin_page(PageSize::A4).unwrap();
        canvas.begin_page(PageSize::LETTER).unwrap();
        assert_eq!(canvas.page_count(), 3);

        let bytes = canvas.finish().unwrap();
        let doc = LopdfDocument::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 4);
    }

    #[test]
    fn test_draw_without_begin_opens_default_page() {
        let options = uncompressed().with_page_size(PageSizePolicy::Fixed(PageSize::A4));
        let mut canvas = PdfCanvas::new(options);
        canvas.draw_glyph(&glyph('A', 10.0, 20.0), 'A').unwrap();
        let bytes = canvas.finish().unwrap();

        let doc = LopdfDocument::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_non_finite_glyph_is_rejected() {
        let mut canvas = PdfCanvas::new(uncompressed());
        canvas.begin_page(PageSize::LETTER).unwrap();
        let err = canvas
            .draw_glyph(&glyph('A', f32::NAN, 20.0), 'A')
            .unwrap_err();
        assert!(matches!(err, GlyphDrawError::NonFiniteCoordinates { .. }));

        // Later glyphs are unaffected
        assert!(canvas.draw_glyph(&glyph('B', 30.0, 20.0), 'B').is_ok());
    }

    #[test]
    fn test_fonts_registered_once() {
        let mut canvas = PdfCanvas::new(uncompressed());
        canvas.begin_page(PageSize::LETTER).unwrap();
        for (i, c) in "Hello".chars().enumerate() {
            let drawn = canvas.draw_glyph(&glyph(c, 10.0 * i as f32, 50.0), c).unwrap();
            assert_eq!(drawn.font, OutputFont::Latin(StandardFont::Helvetica));
            assert!(!drawn.substituted);
        }
        let drawn = canvas.draw_glyph(&glyph('x', 70.0, 50.0), '\u{3042}').unwrap();
        assert_eq!(drawn.font, OutputFont::UnicodeFallback);
        assert_eq!(canvas.font_ids.len(), 2);
    }

    #[test]
    fn test_unknown_source_font_is_substituted() {
        let mut canvas = PdfCanvas::new(uncompressed());
        let record = GlyphRecord::new('Q', 10.0, 10.0, "XYZABC+Unknown", f32::NAN);
        let drawn = canvas.draw_glyph(&record, 'Q').unwrap();
        assert!(drawn.substituted);
        assert_eq!(drawn.font, OutputFont::Latin(StandardFont::Helvetica));
    }

    #[test]
    fn test_save_writes_to_sink() {
        let mut canvas = PdfCanvas::new(RenderOptions::default());
        canvas.draw_glyph(&glyph('A', 10.0, 20.0), 'A').unwrap();
        let mut sink = Vec::new();
        let written = canvas.save(&mut sink).unwrap();
        assert_eq!(written, sink.len());

        let doc = LopdfDocument::load_mem(&sink).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert!(info.get(b"Producer").is_ok());
        assert!(info.get(b"CreationDate").is_ok());
    }
}
