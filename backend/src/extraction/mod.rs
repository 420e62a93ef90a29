//! Content extraction
//!
//! Converts uploaded file bytes into plain text. Stateless; the document
//! service decides what to persist.

pub mod docx;
pub mod eml;
pub mod pdf;
pub mod table;

use crate::config::SUPPORTED_EXTENSIONS;
use crate::error::{AppError, Result};
use std::fmt;
use std::path::Path;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Eml,
}

impl DocumentFormat {
    /// Detect the format from a filename's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "eml" => Ok(DocumentFormat::Eml),
            "" => Err(AppError::UnsupportedFormat(format!(
                "{} has no file extension. Supported: {}",
                filename,
                SUPPORTED_EXTENSIONS.join(", ")
            ))),
            other => Err(AppError::UnsupportedFormat(format!(
                "{}. Supported: {}",
                other,
                SUPPORTED_EXTENSIONS.join(", ")
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Eml => "eml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

/// Extract trimmed plain text from raw bytes of the given format
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String> {
    tracing::info!("Extracting text from {} file ({} bytes)", format, bytes.len());

    let text = match format {
        DocumentFormat::Pdf => pdf::extract(bytes)?,
        DocumentFormat::Docx => docx::extract(bytes)?,
        DocumentFormat::Eml => eml::extract(bytes)?,
    };

    Ok(text.trim().to_string())
}
