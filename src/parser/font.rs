//! Font metrics and character-code handling for layout analysis.
//!
//! Only horizontal advances are needed: each glyph is positioned at the
//! current text origin, then the origin moves by the glyph's width.

use std::collections::HashMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

/// Helvetica advance widths for codes 32..=126, in 1/1000 text space units.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 112-126
];

/// Advance used for codes no metric source knows about.
const FALLBACK_WIDTH: f32 = 500.0;

/// Default width of composite (Type0) glyphs.
const COMPOSITE_DEFAULT_WIDTH: f32 = 1000.0;

/// Upper bound on explicit width entries kept per font.
const MAX_WIDTH_ENTRIES: usize = 0x10000;

/// Metrics and code layout for one font of a page.
#[derive(Debug, Clone)]
pub(crate) struct PageFont {
    /// Base font name (e.g., "ABCDEF+Helvetica-Bold")
    pub base_font: String,
    /// Two-byte codes (Type0 fonts)
    pub composite: bool,
    /// Codes are UCS-2 code units and decode directly
    pub ucs2: bool,
    widths: HashMap<u32, f32>,
    default_width: Option<f32>,
}

impl PageFont {
    /// Build metrics from a page font dictionary.
    pub fn from_dict(doc: &LopdfDocument, dict: &Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| resolve(doc, o).as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let composite = name_of(doc, dict, b"Subtype").as_deref() == Some("Type0");

        if composite {
            let encoding = name_of(doc, dict, b"Encoding").unwrap_or_default();
            let has_to_unicode = dict.get(b"ToUnicode").is_ok();
            let ucs2 = encoding.contains("UCS2") || encoding.contains("UTF16") || !has_to_unicode;

            let descendant = dict
                .get(b"DescendantFonts")
                .ok()
                .and_then(|o| resolve(doc, o).as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|o| resolve(doc, o).as_dict().ok());

            let (widths, default_width) = match descendant {
                Some(d) => (
                    composite_widths(doc, d),
                    d.get(b"DW")
                        .ok()
                        .and_then(|o| get_number(resolve(doc, o)))
                        .unwrap_or(COMPOSITE_DEFAULT_WIDTH),
                ),
                None => (HashMap::new(), COMPOSITE_DEFAULT_WIDTH),
            };

            return Self {
                base_font,
                composite,
                ucs2,
                widths,
                default_width: Some(default_width),
            };
        }

        let mut widths = HashMap::new();
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| get_number(resolve(doc, o)))
            .map(|n| n as u32);
        let width_array = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok());
        if let (Some(first), Some(array)) = (first_char, width_array) {
            for (i, w) in array.iter().enumerate().take(MAX_WIDTH_ENTRIES) {
                let code = u32::try_from(i).ok().and_then(|i| first.checked_add(i));
                if let (Some(code), Some(w)) = (code, get_number(resolve(doc, w))) {
                    widths.insert(code, w);
                }
            }
        }

        let missing_width = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|fd| fd.get(b"MissingWidth").ok())
            .and_then(|o| get_number(resolve(doc, o)));

        Self {
            base_font,
            composite: false,
            ucs2: false,
            widths,
            default_width: missing_width,
        }
    }

    /// Placeholder for a font name missing from the page resources.
    pub fn unknown(resource_name: &[u8]) -> Self {
        Self {
            base_font: String::from_utf8_lossy(resource_name).to_string(),
            composite: false,
            ucs2: false,
            widths: HashMap::new(),
            default_width: None,
        }
    }

    /// Split a shown string into character codes.
    pub fn split_codes<'b>(&self, bytes: &'b [u8]) -> std::slice::Chunks<'b, u8> {
        bytes.chunks(if self.composite { 2 } else { 1 })
    }

    /// Advance width of a code in 1/1000 text space units.
    pub fn glyph_width(&self, code: u32) -> f32 {
        if let Some(w) = self.widths.get(&code) {
            return *w;
        }
        if let Some(w) = self.default_width {
            return w;
        }
        standard_width(&self.base_font, code).unwrap_or(FALLBACK_WIDTH)
    }

    /// Decode a two-byte code as a UCS-2 unit.
    pub fn decode_ucs2(&self, code: &[u8]) -> String {
        char::from_u32(code_value(code))
            .map(String::from)
            .unwrap_or_default()
    }
}

/// Integer value of a big-endian character code.
pub(crate) fn code_value(code: &[u8]) -> u32 {
    code.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// Follow a reference to its target object, or return the object itself.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract a number from an integer or real object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Remove a six-letter subset tag ("ABCDEF+") from a font name.
pub(crate) fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

fn name_of(doc: &LopdfDocument, dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|o| resolve(doc, o).as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
}

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
///
/// CIDs past `u32::MAX` are skipped and at most [`MAX_WIDTH_ENTRIES`] widths
/// are kept.
fn composite_widths(doc: &LopdfDocument, descendant: &Dictionary) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let Some(items) = descendant
        .get(b"W")
        .ok()
        .and_then(|o| resolve(doc, o).as_array().ok())
    else {
        return widths;
    };

    let mut i = 0;
    while i < items.len() && widths.len() < MAX_WIDTH_ENTRIES {
        let Some(first) = get_number(resolve(doc, &items[i])) else {
            break;
        };
        let first = first as u32;
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    if widths.len() >= MAX_WIDTH_ENTRIES {
                        break;
                    }
                    let cid = u32::try_from(offset).ok().and_then(|o| first.checked_add(o));
                    if let (Some(cid), Some(w)) = (cid, get_number(resolve(doc, w))) {
                        widths.insert(cid, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = get_number(last).map(|n| n as u32);
                let width = items.get(i + 2).and_then(|o| get_number(resolve(doc, o)));
                match (last, width) {
                    (Some(last), Some(width)) if last >= first => {
                        for cid in first..=last.min(first.saturating_add(0xFFFF)) {
                            if widths.len() >= MAX_WIDTH_ENTRIES {
                                break;
                            }
                            widths.insert(cid, width);
                        }
                    }
                    _ => {}
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

/// Built-in metrics for fonts that ship without a `/Widths` array.
fn standard_width(base_font: &str, code: u32) -> Option<f32> {
    let name = strip_subset_tag(base_font);
    if name.starts_with("Courier") {
        return Some(600.0);
    }
    if (32..=126).contains(&code) {
        return Some(f32::from(HELVETICA_WIDTHS[(code - 32) as usize]));
    }
    None
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_helvetica_table_covers_printable_ascii() {
        assert_eq!(HELVETICA_WIDTHS.len(), 95);
        assert_eq!(standard_width("Helvetica", b' ' as u32), Some(278.0));
        assert_eq!(standard_width("Helvetica", b'H' as u32), Some(722.0));
        assert_eq!(standard_width("Helvetica", b'~' as u32), Some(584.0));
        assert_eq!(standard_width("ABCDEF+Courier-Bold", b'i' as u32), Some(600.0));
        assert_eq!(standard_width("Helvetica", 200), None);
    }

    #[test]
    fn test_strip_subset_tag() {
        assert_eq!(strip_subset_tag("ABCDEF+Helvetica"), "Helvetica");
        assert_eq!(strip_subset_tag("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_tag("abc+Helvetica"), "abc+Helvetica");
    }

    #[test]
    fn test_simple_font_widths() {
        let doc = LopdfDocument::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(700), Object::Real(650.5)],
        };
        let font = PageFont::from_dict(&doc, &dict);
        assert_eq!(font.base_font, "Arial");
        assert!(!font.composite);
        assert_eq!(font.glyph_width(65), 700.0);
        assert_eq!(font.glyph_width(66), 650.5);
        // Outside the array: built-in metrics
        assert_eq!(font.glyph_width(b'a' as u32), 556.0);
    }

    #[test]
    fn test_composite_font_widths() {
        let doc = LopdfDocument::with_version("1.5");
        let descendant = dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "DW" => 900,
            "W" => vec![
                Object::Integer(1),
                Object::Array(vec![Object::Integer(300), Object::Integer(400)]),
                Object::Integer(10),
                Object::Integer(12),
                Object::Integer(250),
            ],
        };
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "MSGothic",
            "Encoding" => "UniJIS-UCS2-H",
            "DescendantFonts" => vec![Object::Dictionary(descendant)],
        };
        let font = PageFont::from_dict(&doc, &dict);
        assert!(font.composite);
        assert!(font.ucs2);
        assert_eq!(font.glyph_width(1), 300.0);
        assert_eq!(font.glyph_width(2), 400.0);
        assert_eq!(font.glyph_width(11), 250.0);
        assert_eq!(font.glyph_width(500), 900.0);
        assert_eq!(font.split_codes(&[0x30, 0x42, 0x30, 0xA2]).count(), 2);
        assert_eq!(font.decode_ucs2(&[0x30, 0x42]), "\u{3042}");
    }

    #[test]
    fn test_first_char_at_u32_max_does_not_overflow() {
        let doc = LopdfDocument::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "FirstChar" => 4_294_967_295i64,
            "Widths" => vec![Object::Integer(700), Object::Integer(800)],
        };
        let font = PageFont::from_dict(&doc, &dict);
        assert_eq!(font.glyph_width(u32::MAX), 700.0);
        assert_eq!(font.glyph_width(0), FALLBACK_WIDTH);
    }

    #[test]
    fn test_cid_ranges_near_u32_max_are_clamped() {
        let doc = LopdfDocument::with_version("1.5");
        let descendant = dictionary! {
            "Subtype" => "CIDFontType2",
            "W" => vec![
                Object::Integer(4_294_967_295),
                Object::Integer(4_294_967_295),
                Object::Integer(500),
                Object::Integer(4_294_967_295),
                Object::Array(vec![Object::Integer(300), Object::Integer(400)]),
            ],
        };
        let dict = dictionary! {
            "Subtype" => "Type0",
            "BaseFont" => "MSGothic",
            "DescendantFonts" => vec![Object::Dictionary(descendant)],
        };
        let font = PageFont::from_dict(&doc, &dict);
        assert_eq!(font.glyph_width(u32::MAX), 300.0);
        assert_eq!(font.glyph_width(0), COMPOSITE_DEFAULT_WIDTH);
    }

    #[test]
    fn test_width_entries_are_capped() {
        let doc = LopdfDocument::with_version("1.5");
        let mut items = Vec::new();
        for start in 0..8i64 {
            items.extend([
                Object::Integer(start * 0x10000),
                Object::Integer(start * 0x10000 + 0xFFFF),
                Object::Integer(250),
            ]);
        }
        let descendant = dictionary! { "W" => items };
        let widths = composite_widths(&doc, &descendant);
        assert_eq!(widths.len(), MAX_WIDTH_ENTRIES);
        assert_eq!(widths.get(&0), Some(&250.0));
        assert_eq!(widths.get(&0x10000), None);
    }

    #[test]
    fn test_code_value() {
        assert_eq!(code_value(&[0x41]), 0x41);
        assert_eq!(code_value(&[0x30, 0x42]), 0x3042);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0xE9]), "H\u{e9}");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }
}
