//! Integration tests for glyph extraction.

mod common;

use common::{build_pdf, hello_pdf, with_unreadable_page, TextRun};
use noisepdf::{extract_pages, Error, ErrorMode, ExtractOptions, GlyphExtractor};

#[test]
fn test_coordinates_are_top_down() {
    let extractor = GlyphExtractor::from_bytes(&hello_pdf()).unwrap();
    assert_eq!(extractor.page_count(), 1);

    let pages = extractor.extract_all().unwrap();
    let page = &pages[0];
    assert_eq!((page.width, page.height), (612.0, 792.0));

    let line = &page.lines[0];
    assert_eq!(line.text(), "Hello");
    for glyph in &line.glyphs {
        // Baseline at 700 from the bottom
        assert_eq!(glyph.y, page.flip_y(700.0));
        assert_eq!(glyph.font_name, "Helvetica");
        assert_eq!(glyph.font_size, 12.0);
    }
    assert_eq!(line.glyphs[0].x, 100.0);
    assert!(line.glyphs.windows(2).all(|w| w[0].x < w[1].x));
}

#[test]
fn test_lines_in_reading_order() {
    // Drawn bottom line first
    let input = build_pdf(&[vec![
        TextRun::helvetica(72, 500, "second"),
        TextRun::helvetica(72, 600, "first"),
        TextRun::helvetica(72, 400, "third"),
    ]]);
    let pages = GlyphExtractor::from_bytes(&input)
        .unwrap()
        .extract_all()
        .unwrap();

    assert_eq!(pages[0].plain_text(), "first\nsecond\nthird");
}

#[test]
fn test_pages_iterate_lazily_in_order() {
    let input = build_pdf(&[
        vec![TextRun::helvetica(72, 700, "one")],
        vec![TextRun::helvetica(72, 700, "two")],
    ]);
    let extractor = GlyphExtractor::from_bytes(&input).unwrap();
    let mut pages = extractor.pages();

    assert_eq!(pages.len(), 2);
    let first = pages.next().unwrap().unwrap();
    assert_eq!((first.number, first.plain_text()), (1, "one".to_string()));
    let second = pages.next().unwrap().unwrap();
    assert_eq!((second.number, second.plain_text()), (2, "two".to_string()));
    assert!(pages.next().is_none());
}

#[test]
fn test_extract_pages_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.pdf");
    std::fs::write(&path, hello_pdf()).unwrap();

    let pages = extract_pages(&path).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].glyph_count(), 5);
}

#[test]
fn test_unreadable_page_fails_in_strict_mode() {
    let input = with_unreadable_page(&build_pdf(&[vec![], vec![]]), 2);
    let extractor = GlyphExtractor::from_bytes(&input).unwrap();
    assert_eq!(extractor.options().error_mode, ErrorMode::Strict);

    let result = extractor.extract_all();
    assert!(matches!(result, Err(Error::ExtractionFailed(ref msg)) if msg.starts_with("page 2")));
}

#[test]
fn test_unreadable_page_is_blank_in_lenient_mode() {
    let input = with_unreadable_page(
        &build_pdf(&[
            vec![TextRun::helvetica(72, 720, "One")],
            vec![TextRun::helvetica(72, 720, "Two")],
            vec![TextRun::helvetica(72, 720, "Three")],
        ]),
        2,
    );
    let options = ExtractOptions::new().lenient();
    let pages = GlyphExtractor::from_bytes_with_options(&input, options)
        .unwrap()
        .extract_all()
        .unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].plain_text(), "One");
    assert!(pages[1].is_empty());
    assert_eq!(pages[2].plain_text(), "Three");
}

#[test]
fn test_pages_serialize_to_json() {
    let pages = GlyphExtractor::from_bytes(&hello_pdf())
        .unwrap()
        .extract_all()
        .unwrap();
    let json = serde_json::to_value(&pages).unwrap();

    assert_eq!(json[0]["number"], 1);
    assert_eq!(json[0]["lines"][0]["glyphs"][0]["character"], "H");
}
