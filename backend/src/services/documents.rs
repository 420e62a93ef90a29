//! Documents service
//!
//! Upload handling: size check, format detection, text extraction and
//! storage of the extracted text.

use crate::config::{MAX_FILENAME_LENGTH, TEXT_SNIPPET_CHARS};
use crate::database::{Document, DocumentSummary, Repository};
use crate::error::{AppError, Result};
use crate::extraction::{extract_text, DocumentFormat};

/// Service for storing and reading uploaded documents
#[derive(Clone)]
pub struct DocumentsService {
    repo: Repository,
    max_upload_bytes: usize,
}

impl DocumentsService {
    pub fn new(repo: Repository, max_upload_bytes: usize) -> Self {
        Self {
            repo,
            max_upload_bytes,
        }
    }

    /// Extract and store an uploaded file
    pub async fn save(&self, filename: &str, data: Vec<u8>) -> Result<Document> {
        tracing::info!("Saving upload: {} ({} bytes)", filename, data.len());

        if data.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge { limit: self.max_upload_bytes });
        }

        let safe_filename = sanitize_filename(filename);
        let format = DocumentFormat::from_filename(&safe_filename)?;

        // Extraction is CPU bound
        let text = tokio::task::spawn_blocking(move || extract_text(format, &data))
            .await
            .map_err(|e| AppError::Generic(format!("Extraction task failed: {}", e)))??;

        if text.is_empty() {
            return Err(AppError::Extraction(format!(
                "no text found in {} file",
                format
            )));
        }

        let document = self.repo.create_document(&safe_filename, &text).await?;

        tracing::info!(
            "Document stored: {} ({} chars)",
            document.id,
            document.text_length
        );

        Ok(document)
    }

    /// Get a document with its text
    pub async fn get(&self, id: &str) -> Result<Document> {
        self.repo.get_document(id).await
    }

    /// Get a document without its text
    pub async fn get_summary(&self, id: &str) -> Result<DocumentSummary> {
        self.repo.get_document_summary(id).await
    }

    /// List documents, newest first
    pub async fn list(&self) -> Result<Vec<DocumentSummary>> {
        self.repo.list_documents().await
    }
}

/// Preview of a document's text for upload responses
pub fn text_snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TEXT_SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Sanitize filename to prevent path traversal
fn sanitize_filename(filename: &str) -> String {
    // Keep only the last path component
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    base.chars()
        .filter(|c| *c != '\0')
        .take(MAX_FILENAME_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_pool;
    use crate::extraction::docx::tests::build_docx;
    use crate::extraction::pdf::tests::build_pdf;

    async fn service(limit: usize) -> DocumentsService {
        DocumentsService::new(Repository::new(memory_pool().await), limit)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("notes.pdf"), "notes.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename("C:\\docs\\lecture.docx"), "lecture.docx");
        assert_eq!(sanitize_filename("a\0b.eml"), "ab.eml");

        let long = format!("{}.pdf", "x".repeat(300));
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_FILENAME_LENGTH);
    }

    #[test]
    fn test_text_snippet() {
        assert_eq!(text_snippet("short"), "short");

        let long = "a".repeat(250);
        let snippet = text_snippet(&long);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), TEXT_SNIPPET_CHARS + 3);
    }

    #[tokio::test]
    async fn test_save_docx() {
        let service = service(1024 * 1024).await;
        let bytes = build_docx("<w:p><w:r><w:t>Photosynthesis converts light.</w:t></w:r></w:p>");

        let document = service.save("biology.docx", bytes).await.unwrap();

        assert_eq!(document.filename, "biology.docx");
        assert_eq!(document.text_content, "Photosynthesis converts light.");
        assert_eq!(
            document.text_length,
            document.text_content.chars().count() as i64
        );

        let fetched = service.get(&document.id).await.unwrap();
        assert_eq!(fetched.text_content, document.text_content);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_pdf() {
        let service = service(1024 * 1024).await;
        let bytes = build_pdf(&["Chlorophyll absorbs red and blue light."]);

        let document = service.save("lecture.pdf", bytes).await.unwrap();

        assert!(document.text_length > 0);
        assert!(document
            .text_content
            .contains("Chlorophyll absorbs red and blue light."));
    }

    #[tokio::test]
    async fn test_save_eml() {
        let service = service(1024 * 1024).await;
        let raw = b"From: a@example.com\r\nSubject: Notes\r\nContent-Type: text/plain\r\n\r\nMitochondria make ATP.\r\n".to_vec();

        let document = service.save("notes.eml", raw).await.unwrap();
        assert!(document.text_content.contains("Mitochondria make ATP."));
    }

    #[tokio::test]
    async fn test_save_rejects_oversized() {
        let service = service(10).await;
        let result = service.save("big.pdf", vec![0u8; 11]).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge { limit: 10 })));
    }

    #[tokio::test]
    async fn test_save_rejects_unsupported() {
        let service = service(1024).await;
        let result = service.save("slides.pptx", b"data".to_vec()).await;
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_corrupt_and_empty() {
        let service = service(1024 * 1024).await;

        let result = service.save("broken.docx", b"not a zip".to_vec()).await;
        assert!(matches!(result, Err(AppError::Extraction(_))));

        let empty = build_docx("<w:p></w:p>");
        let result = service.save("empty.docx", empty).await;
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let service = service(1024).await;
        let result = service.get_summary("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
