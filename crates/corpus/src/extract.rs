use std::fs;
use std::path::Path;

use thiserror::Error;

/// Errors raised by a text extraction backend.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pluggable text extraction backend.
///
/// Implementations produce the plain text of one document. The dataset loader
/// uses [`supported_extension`](TextExtractor::supported_extension) to decide
/// which files in a directory belong to the backend.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text content of a document, trimmed.
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;

    /// File extension (without dot) this backend handles.
    fn supported_extension(&self) -> &str {
        "pdf"
    }
}

/// Reads `.txt` files verbatim. Used by tests and fixtures where running a
/// PDF toolchain would be overkill.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let text = fs::read_to_string(path)?;
        Ok(text.trim().to_string())
    }

    fn supported_extension(&self) -> &str {
        "txt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_text_extractor_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(b"  hello world \n").unwrap();

        let text = PlainTextExtractor.extract_text(&path).unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn plain_text_extractor_missing_file_is_io_error() {
        let err = PlainTextExtractor
            .extract_text(Path::new("/nonexistent/doc.txt"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn default_extension_is_pdf() {
        struct Dummy;
        impl TextExtractor for Dummy {
            fn extract_text(&self, _: &Path) -> Result<String, ExtractError> {
                Ok(String::new())
            }
        }
        assert_eq!(Dummy.supported_extension(), "pdf");
        assert_eq!(PlainTextExtractor.supported_extension(), "txt");
    }
}
