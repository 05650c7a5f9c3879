//! Integration tests for upload staging.

mod common;

use common::hello_pdf;
use noisepdf::{Error, ObfuscateOptions, Obfuscator, StagedUpload};

fn entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_process_success_removes_staged_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = hello_pdf();
    let upload = StagedUpload::receive(dir.path(), "hello.pdf", input.as_slice()).unwrap();
    assert_eq!(entries(dir.path()), 1);

    let obfuscator = Obfuscator::new(ObfuscateOptions::new().with_noise_level(0.0)).unwrap();
    let download = upload.process(&obfuscator).unwrap();

    assert_eq!(download.file_name, "obfuscated_hello.pdf");
    assert!(download.bytes.starts_with(b"%PDF-"));
    assert_eq!(download.report.glyphs_drawn, 5);
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn test_process_failure_removes_staged_file() {
    let dir = tempfile::tempdir().unwrap();
    let upload = StagedUpload::receive(dir.path(), "broken.PDF", &b"not really a pdf"[..]).unwrap();

    let obfuscator = Obfuscator::new(ObfuscateOptions::default()).unwrap();
    let err = upload.process(&obfuscator).unwrap_err();

    assert!(matches!(err, Error::ExtractionFailed(_)));
    assert_eq!(err.user_message(), "Error processing PDF.");
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn test_non_pdf_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = StagedUpload::receive(dir.path(), "notes.txt", &b"hello"[..]).unwrap_err();

    assert!(matches!(err, Error::UnsupportedUpload(_)));
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn test_upload_name_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let upload = StagedUpload::receive(dir.path(), "../secret/report.pdf", &b"%PDF-"[..]).unwrap();

    assert_eq!(upload.name(), "report.pdf");
    assert_eq!(upload.download_name(), "obfuscated_report.pdf");
    assert!(upload.path().starts_with(dir.path()));
}
