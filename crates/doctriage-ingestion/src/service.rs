//! Extraction entry point used by the upload flow.

use doctriage_core::ExtractionConfig;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::extractors::{ExtractionResult, ExtractorRegistry};
use crate::{IngestionError, Result};

/// Text returned for extensions with no registered extractor.
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type.";

/// Text returned when an extractor fails.
pub const EXTRACTION_FAILED: &str = "Error during OCR or text extraction.";

/// Dispatches stored files to extractors by extension.
#[derive(Debug, Clone)]
pub struct ExtractionService {
    registry: ExtractorRegistry,
    timeout: Duration,
}

impl ExtractionService {
    pub fn new(registry: ExtractorRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(ExtractorRegistry::with_defaults(config), config.timeout())
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Extracts text from `path`, choosing the extractor by `extension`.
    ///
    /// Never fails: an unknown extension yields [`UNSUPPORTED_FILE_TYPE`] and
    /// any extractor error yields [`EXTRACTION_FAILED`].
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn extract(&self, path: &Path, extension: &str) -> String {
        match self.extract_result(path, extension).await {
            Ok(result) => {
                for warning in &result.warnings {
                    warn!(extractor = %result.extractor, warning = %warning, "Extraction warning");
                }
                debug!(
                    extractor = %result.extractor,
                    encoding = result.encoding.as_deref().unwrap_or("binary"),
                    metadata = ?result.metadata,
                    words = result.word_count(),
                    "Text extracted"
                );
                result.text
            }
            Err(IngestionError::UnsupportedType(ext)) => {
                warn!(extension = %ext, "No extractor registered for extension");
                UNSUPPORTED_FILE_TYPE.to_string()
            }
            Err(err) => {
                warn!(error = %err, "Text extraction failed");
                EXTRACTION_FAILED.to_string()
            }
        }
    }

    /// Runs the matching extractor under the configured timeout.
    pub async fn extract_result(&self, path: &Path, extension: &str) -> Result<ExtractionResult> {
        let extractor = self.registry.resolve(extension)?;

        tokio::time::timeout(self.timeout, extractor.extract(path))
            .await
            .unwrap_or(Err(IngestionError::Timeout(self.timeout)))
    }
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
