//! Fixture PDFs built in memory with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// A line of text to place on a fixture page.
pub struct TextRun<'a> {
    pub font: &'a str,
    pub size: i64,
    pub x: i64,
    pub y: i64,
    pub text: &'a str,
}

impl<'a> TextRun<'a> {
    pub fn helvetica(x: i64, y: i64, text: &'a str) -> Self {
        Self {
            font: "Helvetica",
            size: 12,
            x,
            y,
            text,
        }
    }
}

/// Build a PDF with one page per entry of `pages` (612 x 792).
pub fn build_pdf(pages: &[Vec<TextRun<'_>>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for runs in pages {
        let mut fonts = Dictionary::new();
        let mut operations = Vec::new();

        for (i, run) in runs.iter().enumerate() {
            let resource = format!("F{}", i + 1);
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => run.font,
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(resource.clone(), Object::Reference(font_id));

            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(resource.into_bytes()), Object::Integer(run.size)],
                ),
                Operation::new("Td", vec![Object::Integer(run.x), Object::Integer(run.y)]),
                Operation::new("Tj", vec![Object::string_literal(run.text)]),
                Operation::new("ET", vec![]),
            ]);
        }

        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => fonts },
        });
        kids.push(Object::Reference(page_id));
    }

    finish(doc, pages_id, kids)
}

/// A single page with "Hello" in Helvetica 12 at (100, 700).
pub fn hello_pdf() -> Vec<u8> {
    build_pdf(&[vec![TextRun::helvetica(100, 700, "Hello")]])
}

/// One page showing `shown` at (72, 720) with a caller-built font dictionary.
pub fn pdf_with_font(font: Dictionary, shown: &[u8]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(font);
    let operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
        Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
        Operation::new(
            "Tj",
            vec![Object::String(shown.to_vec(), StringFormat::Hexadecimal)],
        ),
        Operation::new("ET", vec![]),
    ];
    let content = Content { operations }.encode().unwrap();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    finish(doc, pages_id, vec![Object::Reference(page_id)])
}

/// Point the `/Contents` of page `number` at an integer instead of a stream.
pub fn with_unreadable_page(bytes: &[u8], number: u32) -> Vec<u8> {
    let mut doc = Document::load_mem(bytes).unwrap();
    let page_id = doc.get_pages()[&number];
    let bogus = doc.add_object(Object::Integer(42));
    doc.get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .unwrap()
        .set("Contents", bogus);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// A single page without a content stream.
pub fn blank_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
    });
    finish(doc, pages_id, vec![Object::Reference(page_id)])
}

fn finish(mut doc: Document, pages_id: ObjectId, kids: Vec<Object>) -> Vec<u8> {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
