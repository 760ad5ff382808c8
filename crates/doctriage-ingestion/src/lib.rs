//! Text extraction for uploaded documents.
//!
//! Extractors are registered by file extension. [`ExtractionService`] is the
//! entry point used by the upload flow: it never fails, and reports problems
//! through placeholder strings that the classifier treats like any other
//! text.
//!
//! # Features
//!
//! - `pdf` (default): PDF text via `pdf-extract`
//! - `docx` (default): Word documents via `docx-rs`
//!
//! Images are read with the `tesseract` command line tool when it is
//! installed.

pub mod extractors;
pub mod service;

pub use extractors::{
    ExtractionResult, ExtractorRegistry, OcrExtractor, PlainTextExtractor, TextExtractor,
};
#[cfg(feature = "docx")]
pub use extractors::DocxExtractor;
#[cfg(feature = "pdf")]
pub use extractors::PdfExtractor;
pub use service::{ExtractionService, EXTRACTION_FAILED, UNSUPPORTED_FILE_TYPE};

use std::time::Duration;

/// Error types for extraction operations
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),
}

impl IngestionError {
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::ExtractionFailed(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, IngestionError>;

impl From<IngestionError> for doctriage_core::AppError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::UnsupportedType(ext) => {
                doctriage_core::AppError::validation(format!("unsupported file type: {}", ext))
            }
            other => doctriage_core::AppError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestionError::UnsupportedType("xyz".to_string());
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_into_app_error() {
        let err: doctriage_core::AppError = IngestionError::UnsupportedType("xyz".into()).into();
        assert!(matches!(err, doctriage_core::AppError::Validation(_)));

        let err: doctriage_core::AppError = IngestionError::OcrFailed("boom".into()).into();
        assert!(matches!(err, doctriage_core::AppError::Internal(_)));
    }
}
