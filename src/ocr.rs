//! OCR boundary.
//!
//! The validation rules only need page texts. Implementations own the
//! actual engine; the default build ships without one, so
//! [`UnavailableExtractor`] stands in and extraction degrades to an error
//! the callers map to an "unknown" reading.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("No OCR engine is configured")]
    Unavailable,
}

/// Extracts text from a scanned document, one string per page.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<Vec<String>, OcrError>;
}

/// Checks the file exists before handing it to the engine.
pub fn extract_document_texts(
    extractor: &dyn TextExtractor,
    path: &Path,
) -> Result<Vec<String>, OcrError> {
    if !path.exists() {
        return Err(OcrError::FileNotFound(path.to_path_buf()));
    }

    tracing::info!(path = %path.display(), "Running OCR");
    let pages = extractor.extract_text(path)?;
    tracing::info!(pages = pages.len(), "OCR completed");
    Ok(pages)
}

/// Stand-in for builds without an OCR engine.
#[derive(Debug, Default)]
pub struct UnavailableExtractor;

impl TextExtractor for UnavailableExtractor {
    fn extract_text(&self, path: &Path) -> Result<Vec<String>, OcrError> {
        tracing::debug!(path = %path.display(), "OCR requested but no engine is configured");
        Err(OcrError::Unavailable)
    }
}

/// Fixed-output extractor for tests and dry runs.
#[derive(Debug, Clone)]
pub struct MockTextExtractor {
    pub pages: Vec<String>,
}

impl MockTextExtractor {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl TextExtractor for MockTextExtractor {
    fn extract_text(&self, _path: &Path) -> Result<Vec<String>, OcrError> {
        Ok(self.pages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_pages() {
        let extractor = MockTextExtractor::new(&["page one", "page two"]);
        let pages = extractor.extract_text(Path::new("ignored.pdf")).unwrap();
        assert_eq!(pages, vec!["page one", "page two"]);
    }

    #[test]
    fn unavailable_extractor_always_errors() {
        let extractor = UnavailableExtractor;
        let err = extractor.extract_text(Path::new("any.pdf")).unwrap_err();
        assert!(matches!(err, OcrError::Unavailable));
    }

    #[test]
    fn missing_file_is_rejected_before_the_engine_runs() {
        let extractor = MockTextExtractor::new(&["never returned"]);
        let err =
            extract_document_texts(&extractor, Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, OcrError::FileNotFound(_)));
    }

    #[test]
    fn existing_file_is_handed_to_the_engine() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let extractor = MockTextExtractor::new(&["crown order, zirconia"]);

        let pages = extract_document_texts(&extractor, file.path()).unwrap();
        assert_eq!(pages.len(), 1);
    }
}
