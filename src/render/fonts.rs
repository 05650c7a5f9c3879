//! Output font selection and text encoding.
//!
//! Latin text is drawn with the Standard 14 fonts in WinAnsiEncoding, which
//! every reader ships. Anything else in the Basic Multilingual Plane goes to a
//! predefined CJK CID font addressed by UCS-2 code units.

use std::fmt;

use lopdf::{dictionary, Document as LopdfDocument, Object, ObjectId, Stream, StringFormat};
use serde::{Deserialize, Serialize};

use crate::error::GlyphDrawError;
use crate::parser::font::strip_subset_tag;

/// Base font of the Unicode fallback.
pub const UNICODE_FALLBACK_FONT: &str = "HeiseiKakuGo-W5";

/// Predefined CMap of the Unicode fallback.
const UNICODE_FALLBACK_ENCODING: &str = "UniJIS-UCS2-H";

/// Resource name of the Unicode fallback.
pub(crate) const UNICODE_FALLBACK_RESOURCE: &str = "FU";

/// The Latin Standard 14 fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 12] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
    ];

    /// PostScript name used as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Look up a font by its exact PostScript name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.base_font() == name)
    }

    /// Resource name inside the output page dictionaries.
    pub(crate) fn resource_name(&self) -> String {
        let index = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        format!("F{}", index + 1)
    }
}

impl fmt::Display for StandardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_font())
    }
}

/// Common names of metric-compatible fonts.
const ALIASES: &[(&str, StandardFont)] = &[
    ("Arial", StandardFont::Helvetica),
    ("ArialMT", StandardFont::Helvetica),
    ("Arial-BoldMT", StandardFont::HelveticaBold),
    ("Arial,Bold", StandardFont::HelveticaBold),
    ("Arial-ItalicMT", StandardFont::HelveticaOblique),
    ("Arial,Italic", StandardFont::HelveticaOblique),
    ("Arial-BoldItalicMT", StandardFont::HelveticaBoldOblique),
    ("Arial,BoldItalic", StandardFont::HelveticaBoldOblique),
    ("TimesNewRoman", StandardFont::TimesRoman),
    ("TimesNewRomanPSMT", StandardFont::TimesRoman),
    ("TimesNewRomanPS-BoldMT", StandardFont::TimesBold),
    ("TimesNewRoman,Bold", StandardFont::TimesBold),
    ("TimesNewRomanPS-ItalicMT", StandardFont::TimesItalic),
    ("TimesNewRoman,Italic", StandardFont::TimesItalic),
    ("TimesNewRomanPS-BoldItalicMT", StandardFont::TimesBoldItalic),
    ("TimesNewRoman,BoldItalic", StandardFont::TimesBoldItalic),
    ("CourierNew", StandardFont::Courier),
    ("CourierNewPSMT", StandardFont::Courier),
    ("CourierNewPS-BoldMT", StandardFont::CourierBold),
    ("CourierNewPS-ItalicMT", StandardFont::CourierOblique),
    ("CourierNewPS-BoldItalicMT", StandardFont::CourierBoldOblique),
    ("Times", StandardFont::TimesRoman),
];

/// The font a glyph ends up drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFont {
    Latin(StandardFont),
    UnicodeFallback,
}

impl OutputFont {
    /// Resource name inside the output page dictionaries.
    pub(crate) fn resource_name(&self) -> String {
        match self {
            OutputFont::Latin(font) => font.resource_name(),
            OutputFont::UnicodeFallback => UNICODE_FALLBACK_RESOURCE.to_string(),
        }
    }
}

/// An encoded character ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedGlyph {
    pub font: OutputFont,
    pub bytes: Vec<u8>,
    /// The source font had no Latin counterpart and the default font was used
    pub substituted: bool,
}

impl EncodedGlyph {
    pub(crate) fn string_format(&self) -> StringFormat {
        match self.font {
            OutputFont::Latin(_) => StringFormat::Literal,
            OutputFont::UnicodeFallback => StringFormat::Hexadecimal,
        }
    }
}

/// Maps source font names to output fonts.
#[derive(Debug, Clone)]
pub struct FontTable {
    default_font: StandardFont,
    unicode_fallback: bool,
}

impl FontTable {
    pub fn new(default_font: StandardFont, unicode_fallback: bool) -> Self {
        Self {
            default_font,
            unicode_fallback,
        }
    }

    /// Find the Latin font matching a source font name, if any.
    pub fn resolve(&self, source_name: &str) -> Option<StandardFont> {
        let name = strip_subset_tag(source_name.trim());
        StandardFont::from_name(name).or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|(_, font)| *font)
        })
    }

    /// Encode `ch` for a glyph whose source font was `source_name`.
    pub fn encode(&self, source_name: &str, ch: char) -> Result<EncodedGlyph, GlyphDrawError> {
        let resolved = self.resolve(source_name);
        let substituted = resolved.is_none();

        if let Some(byte) = win_ansi_byte(ch) {
            return Ok(EncodedGlyph {
                font: OutputFont::Latin(resolved.unwrap_or(self.default_font)),
                bytes: vec![byte],
                substituted,
            });
        }

        if self.unicode_fallback && !ch.is_control() {
            if let Ok(unit) = u16::try_from(u32::from(ch)) {
                return Ok(EncodedGlyph {
                    font: OutputFont::UnicodeFallback,
                    bytes: unit.to_be_bytes().to_vec(),
                    substituted: false,
                });
            }
        }

        Err(GlyphDrawError::Unencodable(ch))
    }
}

/// WinAnsiEncoding byte for a character, if it has one.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = u32::from(ch);
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => WIN_ANSI_SPECIALS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, b)| *b),
    }
}

/// Characters WinAnsi places in 0x80..=0x9F.
const WIN_ANSI_SPECIALS: &[(char, u8)] = &[
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// Add a Latin font dictionary to `doc`.
pub(crate) fn add_latin_font(doc: &mut LopdfDocument, font: StandardFont) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Add the Unicode fallback font and its descendants to `doc`.
pub(crate) fn add_unicode_fallback_font(doc: &mut LopdfDocument) -> ObjectId {
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => UNICODE_FALLBACK_FONT,
        "Flags" => 4,
        "FontBBox" => vec![
            Object::Integer(-92),
            Object::Integer(-250),
            Object::Integer(1010),
            Object::Integer(922),
        ],
        "ItalicAngle" => 0,
        "Ascent" => 752,
        "Descent" => -221,
        "CapHeight" => 737,
        "StemV" => 58,
    });

    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => UNICODE_FALLBACK_FONT,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Japan1"),
            "Supplement" => 2,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
    });

    let to_unicode_id = doc.add_object(Stream::new(
        dictionary! {},
        ucs2_to_unicode_cmap().into_bytes(),
    ));

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => UNICODE_FALLBACK_FONT,
        "Encoding" => UNICODE_FALLBACK_ENCODING,
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
        "ToUnicode" => to_unicode_id,
    })
}

/// Identity ToUnicode CMap for two-byte UCS-2 codes.
fn ucs2_to_unicode_cmap() -> String {
    let ranges: Vec<String> = (0x00u32..=0xFF)
        .filter(|hi| !(0xD8..=0xDF).contains(hi))
        .map(|hi| format!("<{hi:02X}00> <{hi:02X}FF> <{hi:02X}00>"))
        .collect();

    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    for chunk in ranges.chunks(100) {
        cmap.push_str(&format!("{} beginbfrange\n", chunk.len()));
        for range in chunk {
            cmap.push_str(range);
            cmap.push('\n');
        }
        cmap.push_str("endbfrange\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}
