//! Error types for noisepdf library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for noisepdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while obfuscating a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// The input path or stream does not resolve to readable bytes.
    #[error("Input not found: {}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input is not a parseable PDF, or layout analysis failed.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// A single glyph could not be drawn. Never fatal for the pipeline.
    #[error("Glyph draw failed: {0}")]
    GlyphDrawFailed(#[from] GlyphDrawError),

    /// The output document could not be finalized or written.
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Options were rejected before any work started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An upload was refused at the staging boundary.
    #[error("Unsupported upload: {0}")]
    UnsupportedUpload(String),

    /// I/O error while staging input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Reasons a single glyph is skipped by the renderer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlyphDrawError {
    /// One of the coordinates is NaN or infinite.
    #[error("non-finite coordinates x={x}, y={y}")]
    NonFiniteCoordinates { x: f32, y: f32 },

    /// No available font can encode the character.
    #[error("no font can encode {0:?}")]
    Unencodable(char),
}

impl Error {
    /// Plain-text message suitable for an upload front end.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::UnsupportedUpload(_) => "Only PDF files are allowed.",
            Error::Io(_) => "File upload failed.",
            _ => "Error processing PDF.",
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => {
                Error::ExtractionFailed("document is encrypted".to_string())
            }
            _ => Error::ExtractionFailed(err.to_string()),
        }
    }
}
