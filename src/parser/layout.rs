//! Layout analysis for PDF pages.
//!
//! Walks a page's content stream, tracking the graphics and text state, and
//! produces one [`GlyphRecord`] per drawn character. Glyphs are then grouped
//! into lines in reading order (top to bottom, left to right).

use std::cmp::Ordering;
use std::collections::HashMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{GlyphRecord, Page, TextLine};

use super::font::{code_value, decode_text_simple, get_number, resolve, PageFont};
use super::options::ExtractOptions;

/// Default page box when none can be found (US Letter).
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum depth when walking the page tree for inherited attributes.
const MAX_INHERIT_DEPTH: usize = 10;

/// An affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Translation part, i.e. where the origin lands.
    pub fn origin(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Length of the transformed unit vertical vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
        (n.len() == 6).then(|| Matrix::new(n[0], n[1], n[2], n[3], n[4], n[5]))
    }
}

/// Graphics state entries that affect glyph placement (saved by `q`).
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_key: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            font_key: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Content stream interpreter state for one page.
struct TextState {
    gs: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text_block: bool,
}

impl TextState {
    fn new(ctm: Matrix) -> Self {
        Self {
            gs: GraphicsState::new(ctm),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text_block: false,
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.gs.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// Lay out one shown string, pushing a glyph per decoded character.
    fn show_string(
        &mut self,
        bytes: &[u8],
        font: &PageFont,
        decode: &dyn Fn(&[u8]) -> String,
        page: &Page,
        out: &mut Vec<GlyphRecord>,
    ) {
        let size = self.gs.font_size;
        let scale = self.gs.horizontal_scale;

        for code in font.split_codes(bytes) {
            let render = Matrix::new(size * scale, 0.0, 0.0, size, 0.0, self.gs.rise)
                .multiply(&self.text_matrix)
                .multiply(&self.gs.ctm);
            let (x, baseline) = render.origin();
            let effective_size = render.vertical_scale();

            for ch in decode(code).chars().filter(|c| !c.is_control()) {
                out.push(GlyphRecord::new(
                    ch,
                    x,
                    page.flip_y(baseline),
                    font.base_font.clone(),
                    effective_size,
                ));
            }

            let width = font.glyph_width(code_value(code)) / 1000.0;
            let word_spacing = if code == [b' '] {
                self.gs.word_spacing
            } else {
                0.0
            };
            self.advance((width * size + self.gs.char_spacing + word_spacing) * scale);
        }
    }

    /// Apply a TJ positioning adjustment (thousandths of text space).
    fn adjust(&mut self, amount: f32) {
        self.advance(-amount / 1000.0 * self.gs.font_size * self.gs.horizontal_scale);
    }
}

/// Layout analyzer turning page content streams into glyph lines.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
    options: ExtractOptions,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument, options: ExtractOptions) -> Self {
        Self { doc, options }
    }

    /// Analyze a page into lines of positioned glyphs.
    pub fn analyze_page(&self, page_num: u32, page_id: ObjectId) -> Result<Page> {
        let mut page = self.blank_page(page_num, page_id);
        let media_box = self.media_box(page_id);

        let on_page = move |e: Error| match e {
            Error::ExtractionFailed(msg) => {
                Error::ExtractionFailed(format!("page {}: {}", page_num, msg))
            }
            other => other,
        };

        let Some(content) = self.page_content(page_id).map_err(on_page)? else {
            log::debug!("Page {} has no content stream", page_num);
            return Ok(page);
        };

        let origin = Matrix::translation(-media_box[0], -media_box[1]);
        let glyphs = self
            .page_glyphs(page_id, &content, origin, &page)
            .map_err(on_page)?;
        let glyph_count = glyphs.len();

        page.lines = self.group_into_lines(glyphs);
        log::debug!(
            "Page {}: {} glyphs in {} lines",
            page_num,
            glyph_count,
            page.lines.len()
        );
        Ok(page)
    }

    /// A page with the right dimensions and no text.
    pub fn blank_page(&self, page_num: u32, page_id: ObjectId) -> Page {
        let [x0, y0, x1, y1] = self.media_box(page_id);
        Page::new(page_num, (x1 - x0).abs(), (y1 - y0).abs())
    }

    /// Page MediaBox, inherited through the page tree when absent.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let mut current = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_INHERIT_DEPTH {
            let Some(dict) = current else { break };
            if let Some(array) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| resolve(self.doc, o).as_array().ok())
            {
                let values: Vec<f32> = array
                    .iter()
                    .filter_map(|o| get_number(resolve(self.doc, o)))
                    .collect();
                if values.len() == 4 {
                    let (x0, x1) = (values[0].min(values[2]), values[0].max(values[2]));
                    let (y0, y1) = (values[1].min(values[3]), values[1].max(values[3]));
                    return [x0, y0, x1, y1];
                }
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|o| resolve(self.doc, o).as_dict().ok());
        }
        DEFAULT_MEDIA_BOX
    }

    /// Get the concatenated page content stream, `None` if the page has none.
    fn page_content(&self, page_id: ObjectId) -> Result<Option<Vec<u8>>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(None);
        };

        let refs: Vec<&Object> = match resolve(self.doc, contents) {
            Object::Array(arr) => arr.iter().collect(),
            other => vec![other],
        };

        let mut content = Vec::new();
        for obj in refs {
            match resolve(self.doc, obj) {
                Object::Stream(s) => {
                    // Unfiltered streams report an error here; use their raw bytes
                    match s.decompressed_content() {
                        Ok(data) => content.extend_from_slice(&data),
                        Err(_) => content.extend_from_slice(&s.content),
                    }
                    content.push(b'\n');
                }
                Object::Null => {}
                _ => {
                    return Err(Error::ExtractionFailed(
                        "page content is not a stream".to_string(),
                    ));
                }
            }
        }
        Ok(Some(content))
    }

    /// Interpret a content stream and collect glyphs in drawing order.
    fn page_glyphs(
        &self,
        page_id: ObjectId,
        content: &[u8],
        origin: Matrix,
        page: &Page,
    ) -> Result<Vec<GlyphRecord>> {
        let content = lopdf::content::Content::decode(content)
            .map_err(|e| Error::ExtractionFailed(e.to_string()))?;

        let lopdf_fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let fonts: HashMap<Vec<u8>, PageFont> = lopdf_fonts
            .iter()
            .map(|(name, dict)| (name.clone(), PageFont::from_dict(self.doc, dict)))
            .collect();

        let mut state = TextState::new(origin);
        let mut glyphs = Vec::new();

        for op in content.operations {
            let operands = &op.operands;
            let number = |i: usize| operands.get(i).and_then(get_number);

            match op.operator.as_str() {
                "q" => state.stack.push(state.gs.clone()),
                "Q" => {
                    if let Some(saved) = state.stack.pop() {
                        state.gs = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.gs.ctm = m.multiply(&state.gs.ctm);
                    }
                }
                "BT" => {
                    state.in_text_block = true;
                    state.text_matrix = Matrix::IDENTITY;
                    state.line_matrix = Matrix::IDENTITY;
                }
                "ET" => state.in_text_block = false,
                "Tf" => {
                    if let Some(Object::Name(key)) = operands.first() {
                        state.gs.font_key = key.clone();
                    }
                    state.gs.font_size = number(1).unwrap_or(state.gs.font_size);
                }
                "Tc" => state.gs.char_spacing = number(0).unwrap_or(0.0),
                "Tw" => state.gs.word_spacing = number(0).unwrap_or(0.0),
                "Tz" => state.gs.horizontal_scale = number(0).unwrap_or(100.0) / 100.0,
                "TL" => state.gs.leading = number(0).unwrap_or(0.0),
                "Ts" => state.gs.rise = number(0).unwrap_or(0.0),
                "Td" => state.move_line(number(0).unwrap_or(0.0), number(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = number(1).unwrap_or(0.0);
                    state.gs.leading = -ty;
                    state.move_line(number(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.text_matrix = m;
                        state.line_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" {
                        state.next_line();
                    }
                    if op.operator == "\"" {
                        state.gs.word_spacing = number(0).unwrap_or(state.gs.word_spacing);
                        state.gs.char_spacing = number(1).unwrap_or(state.gs.char_spacing);
                        state.next_line();
                    }
                    if !state.in_text_block {
                        continue;
                    }

                    let key = state.gs.font_key.clone();
                    let unknown;
                    let font = match fonts.get(&key) {
                        Some(f) => f,
                        None => {
                            unknown = PageFont::unknown(&key);
                            &unknown
                        }
                    };
                    let encoding = lopdf_fonts
                        .get(&key)
                        .and_then(|f| f.get_font_encoding(self.doc).ok());
                    let decode = |code: &[u8]| -> String {
                        if font.ucs2 && code.len() == 2 {
                            return font.decode_ucs2(code);
                        }
                        if let Some(ref enc) = encoding {
                            if let Ok(text) = LopdfDocument::decode_text(enc, code) {
                                return text;
                            }
                        }
                        decode_text_simple(code)
                    };

                    let text_index = if op.operator == "\"" { 2 } else { 0 };
                    match operands.get(text_index) {
                        Some(Object::String(bytes, _)) => {
                            state.show_string(bytes, font, &decode, page, &mut glyphs);
                        }
                        Some(Object::Array(items)) if op.operator == "TJ" => {
                            for item in items {
                                match item {
                                    Object::String(bytes, _) => {
                                        state.show_string(bytes, font, &decode, page, &mut glyphs)
                                    }
                                    other => {
                                        if let Some(n) = get_number(other) {
                                            state.adjust(n);
                                        }
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        Ok(glyphs)
    }

    /// Group glyphs into lines by baseline, then split on wide horizontal gaps.
    fn group_into_lines(&self, glyphs: Vec<GlyphRecord>) -> Vec<TextLine> {
        if glyphs.is_empty() {
            return vec![];
        }

        // Top-down y ascending; stable so content order breaks ties
        let mut glyphs = glyphs;
        glyphs.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal));

        let mut rows: Vec<Vec<GlyphRecord>> = Vec::new();
        let mut current: Vec<GlyphRecord> = Vec::new();
        let mut row_y: Option<f32> = None;

        for glyph in glyphs {
            let tolerance = glyph.font_size * self.options.line_overlap;
            match row_y {
                Some(y) if (glyph.y - y).abs() <= tolerance => current.push(glyph),
                _ => {
                    if !current.is_empty() {
                        rows.push(std::mem::take(&mut current));
                    }
                    row_y = Some(glyph.y);
                    current.push(glyph);
                }
            }
        }
        if !current.is_empty() {
            rows.push(current);
        }

        let mut lines = Vec::new();
        for mut row in rows {
            row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

            let mut segment: Vec<GlyphRecord> = Vec::new();
            for glyph in row {
                if let Some(prev) = segment.last() {
                    let max_gap = prev.font_size.max(1.0) * self.options.char_margin;
                    if glyph.x - prev.x > max_gap {
                        lines.push(TextLine::new(std::mem::take(&mut segment)));
                    }
                }
                segment.push(glyph);
            }
            if !segment.is_empty() {
                lines.push(TextLine::new(segment));
            }
        }

        lines
    }
}
