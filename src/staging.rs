//! Upload staging.
//!
//! An upload is copied into a named temporary file inside a caller-supplied
//! directory, processed from there, and removed when the handle is dropped,
//! whether or not processing succeeded.

use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::pipeline::{ObfuscationReport, Obfuscator};

/// Prefix of every download name.
pub const DOWNLOAD_PREFIX: &str = "obfuscated_";

/// An uploaded PDF held in a temporary file.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    name: String,
}

/// Result of processing a staged upload.
#[derive(Debug, Clone, Serialize)]
pub struct ObfuscatedDownload {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub report: ObfuscationReport,
}

impl StagedUpload {
    /// Stage `reader` under `dir`, validating the client-supplied name.
    pub fn receive<P: AsRef<Path>, R: Read>(
        dir: P,
        original_name: &str,
        mut reader: R,
    ) -> Result<Self> {
        let name = sanitize_name(original_name)?;

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        let copied = io::copy(&mut reader, &mut file)?;
        file.flush()?;

        log::debug!(
            "Staged upload {} ({} bytes) at {}",
            name,
            copied,
            file.path().display()
        );
        Ok(Self { file, name })
    }

    /// Sanitized upload name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the staged bytes.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Name the processed document is offered under.
    pub fn download_name(&self) -> String {
        format!("{}{}", DOWNLOAD_PREFIX, self.name)
    }

    /// Run the pipeline on the staged file. The file is removed afterwards.
    pub fn process(self, obfuscator: &Obfuscator) -> Result<ObfuscatedDownload> {
        let mut bytes = Vec::new();
        let report = obfuscator.obfuscate_file(self.file.path(), &mut bytes)?;
        Ok(ObfuscatedDownload {
            file_name: self.download_name(),
            bytes,
            report,
        })
    }
}

/// Strip directory components and require a `.pdf` extension.
fn sanitize_name(original: &str) -> Result<String> {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let name: String = base.chars().filter(|c| !c.is_control()).collect();

    if name.is_empty() {
        return Err(Error::UnsupportedUpload("no file name given".to_string()));
    }
    let lower = name.to_ascii_lowercase();
    if !lower.ends_with(".pdf") || lower == ".pdf" {
        return Err(Error::UnsupportedUpload(format!("{} is not a PDF", name)));
    }
    Ok(name)
}
