//! Document text extraction: binary résumé in, plain text out.
//!
//! Pages are decoded independently; pages that yield no text (scanned images,
//! blank separators) are skipped rather than failing the document.

use std::io::ErrorKind;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, info};

use crate::errors::AppError;

/// Document types the extractor can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
}

impl DocumentFormat {
    /// Resolves a declared format such as `"pdf"`, `".PDF"` or `"application/pdf"`.
    pub fn from_declared(declared: &str) -> Result<Self, AppError> {
        match declared.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pdf" | "application/pdf" => Ok(DocumentFormat::Pdf),
            other => Err(AppError::UnsupportedFormat(format!(
                "'{other}' (supported: pdf)"
            ))),
        }
    }

    /// Derives the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                AppError::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;
        Self::from_declared(ext)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts text, taking the format from the file extension.
    pub async fn extract(&self, path: &Path) -> Result<String, AppError> {
        ensure_exists(path).await?;
        let format = DocumentFormat::from_path(path)?;
        self.extract_with_format(path, format).await
    }

    /// Extracts text using a caller-declared format (e.g. from an upload's
    /// content type) instead of the extension.
    pub async fn extract_declared(&self, path: &Path, declared: &str) -> Result<String, AppError> {
        ensure_exists(path).await?;
        let format = DocumentFormat::from_declared(declared)?;
        self.extract_with_format(path, format).await
    }

    async fn extract_with_format(
        &self,
        path: &Path,
        format: DocumentFormat,
    ) -> Result<String, AppError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(path.display().to_string()),
            _ => AppError::Extraction(format!("failed to read {}: {e}", path.display())),
        })?;

        let pages = match format {
            DocumentFormat::Pdf => tokio::task::spawn_blocking(move || decode_pdf_pages(&bytes))
                .await
                .map_err(|e| AppError::Extraction(format!("decoder task failed: {e}")))??,
        };

        let total_pages = pages.len();
        let text = join_pages(pages);
        if text.is_empty() {
            return Err(AppError::Extraction(format!(
                "no extractable text in {} ({total_pages} pages)",
                path.display()
            )));
        }

        info!(
            "Extracted {} chars from {} ({} pages)",
            text.len(),
            path.display(),
            total_pages
        );
        Ok(text)
    }
}

async fn ensure_exists(path: &Path) -> Result<(), AppError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(AppError::NotFound(format!("{} is not a file", path.display()))),
        Err(_) => Err(AppError::NotFound(path.display().to_string())),
    }
}

/// pdf-extract panics on some malformed inputs; those are decoder failures too.
fn decode_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, AppError> {
    match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(AppError::Extraction(format!("cannot open PDF: {e}"))),
        Err(_) => Err(AppError::Extraction(
            "PDF decoder panicked on malformed input".to_string(),
        )),
    }
}

/// Joins page texts in document order, dropping whitespace-only pages.
pub fn join_pages(pages: Vec<String>) -> String {
    let kept: Vec<String> = pages
        .into_iter()
        .enumerate()
        .filter_map(|(index, page)| {
            let trimmed = page.trim();
            if trimmed.is_empty() {
                debug!("Skipping page {} with no extractable text", index + 1);
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect();
    kept.join("\n")
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_format_from_declared_variants() {
        assert_eq!(DocumentFormat::from_declared("pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_declared(".PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(
            DocumentFormat::from_declared("application/pdf").unwrap(),
            DocumentFormat::Pdf
        );
        assert!(matches!(
            DocumentFormat::from_declared("docx"),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_from_path_without_extension() {
        assert!(matches!(
            DocumentFormat::from_path(Path::new("resume")),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_join_pages_keeps_order_and_skips_blank_pages() {
        let pages = vec![
            "First page".to_string(),
            "   \n ".to_string(),
            "Second page\n".to_string(),
            String::new(),
            "Third".to_string(),
        ];
        assert_eq!(join_pages(pages), "First page\nSecond page\nThird");
    }

    #[test]
    fn test_join_pages_all_blank_is_empty() {
        assert_eq!(join_pages(vec![" ".to_string(), String::new()]), "");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = DocumentTextExtractor::new()
            .extract(&dir.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "resume.docx", b"PK\x03\x04");
        let err = DocumentTextExtractor::new().extract(&path).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_declared_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "upload.bin", b"plain text");
        let err = DocumentTextExtractor::new()
            .extract_declared(&path, "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.pdf", b"this is not a pdf at all");
        let err = DocumentTextExtractor::new().extract(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_pages_are_extracted_in_order_skipping_blank_ones() {
        let dir = TempDir::new().unwrap();
        let pdf = fixtures::minimal_pdf(&[Some("Alpha Rust"), None, Some("Omega Tokio")]);
        let path = write(&dir, "cv.pdf", &pdf);

        let text = DocumentTextExtractor::new().extract(&path).await.unwrap();
        let alpha = text.find("Alpha").expect("first page text");
        let omega = text.find("Omega").expect("third page text");
        assert!(alpha < omega);
        assert!(!text.trim().is_empty());
    }

    #[tokio::test]
    async fn test_pdf_without_text_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let pdf = fixtures::minimal_pdf(&[None, None]);
        let path = write(&dir, "scanned.pdf", &pdf);
        let err = DocumentTextExtractor::new().extract(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
