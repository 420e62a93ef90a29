//! PDF text extraction
//!
//! Text comes from `pdf-extract`; column-aligned runs of lines are then
//! rewritten as markdown tables.

use super::table::render_aligned_tables;
use crate::error::{AppError, Result};
use std::panic;

/// Extract plain text from PDF bytes
pub fn extract(bytes: &[u8]) -> Result<String> {
    if !bytes.starts_with(b"%PDF") {
        return Err(AppError::Extraction("missing PDF header".to_string()));
    }

    // pdf-extract panics on some malformed files instead of returning an error
    let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| AppError::Extraction("PDF parser failed on this file".to_string()))?
        .map_err(|e| AppError::Extraction(format!("unreadable PDF: {}", e)))?;

    Ok(render_aligned_tables(&normalize_pages(&text)).trim().to_string())
}

/// Drop form feeds between pages and collapse runs of blank lines
fn normalize_pages(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.replace('\u{c}', "\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}
