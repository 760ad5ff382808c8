//! Document Text Extractors
//!
//! Each extractor turns one family of stored files into plain text. The
//! registry picks an extractor by lower-cased file extension.

use async_trait::async_trait;
use doctriage_core::ExtractionConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{IngestionError, Result};

/// Result of text extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted text content
    pub text: String,
    /// Name of the extractor that produced the text
    pub extractor: String,
    /// Character encoding used, when the source was decoded as text
    pub encoding: Option<String>,
    /// Extracted metadata
    pub metadata: HashMap<String, serde_json::Value>,
    /// Warnings during extraction
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    pub fn new(text: impl Into<String>, extractor: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extractor: extractor.into(),
            encoding: None,
            metadata: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Trait for document text extractors
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract text from the file at `path`
    async fn extract(&self, path: &Path) -> Result<ExtractionResult>;

    /// Lower-case file extensions this extractor handles, without the dot
    fn extensions(&self) -> &'static [&'static str];

    /// Get extractor name
    fn name(&self) -> &'static str;
}

/// Plain text extractor
pub struct PlainTextExtractor {
    /// Maximum content size to process
    max_size: usize,
}

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self {
            max_size: 10 * 1024 * 1024,
        }
    }

    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Decodes bytes as UTF-8, falling back to Windows-1252.
    pub fn decode(content: &[u8]) -> (String, &'static str) {
        match std::str::from_utf8(content) {
            Ok(s) => (s.trim_start_matches('\u{feff}').to_string(), "utf-8"),
            Err(_) => {
                let (decoded, actual_encoding, had_errors) =
                    encoding_rs::WINDOWS_1252.decode(content);
                if had_errors {
                    (decoded.into_owned(), "windows-1252-lossy")
                } else {
                    (decoded.into_owned(), actual_encoding.name())
                }
            }
        }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        let content = tokio::fs::read(path).await?;

        if content.len() > self.max_size {
            return Err(IngestionError::extraction(format!(
                "Content too large: {} bytes (max {})",
                content.len(),
                self.max_size
            )));
        }

        let (text, encoding) = Self::decode(&content);

        debug!(encoding = %encoding, size = content.len(), "Extracted plain text");

        let result = ExtractionResult::new(text, self.name()).with_encoding(encoding);
        if encoding == "utf-8" {
            Ok(result)
        } else {
            Ok(result.with_warning(format!("not valid UTF-8, decoded as {}", encoding)))
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn name(&self) -> &'static str {
        "plain_text"
    }
}

/// Word document extractor
#[cfg(feature = "docx")]
#[derive(Debug, Default)]
pub struct DocxExtractor;

#[cfg(feature = "docx")]
impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Paragraph text, one paragraph per line; empty paragraphs are skipped.
    fn paragraphs(data: &[u8]) -> Result<Vec<String>> {
        use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

        let docx = read_docx(data).map_err(|e| IngestionError::extraction(e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in docx.document.children.iter() {
            let DocumentChild::Paragraph(para) = child else {
                continue;
            };

            let text: String = para
                .children
                .iter()
                .filter_map(|pc| match pc {
                    ParagraphChild::Run(run) => Some(run),
                    _ => None,
                })
                .flat_map(|run| run.children.iter())
                .filter_map(|rc| match rc {
                    RunChild::Text(t) => Some(t.text.as_str()),
                    _ => None,
                })
                .collect();

            if !text.is_empty() {
                paragraphs.push(text);
            }
        }

        Ok(paragraphs)
    }
}

#[cfg(feature = "docx")]
#[async_trait]
impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        let content = tokio::fs::read(path).await?;

        let paragraphs = tokio::task::spawn_blocking(move || Self::paragraphs(&content))
            .await
            .map_err(|e| IngestionError::extraction(format!("docx task failed: {}", e)))??;

        debug!(paragraphs = paragraphs.len(), "Extracted docx text");

        Ok(ExtractionResult::new(paragraphs.join("\n"), self.name())
            .with_metadata("paragraph_count", serde_json::json!(paragraphs.len())))
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn name(&self) -> &'static str {
        "docx"
    }
}

/// PDF extractor
#[cfg(feature = "pdf")]
#[derive(Debug, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "pdf")]
#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        let content = tokio::fs::read(path).await?;

        // pdf-extract is synchronous and panics on some malformed input;
        // a panic surfaces here as a JoinError.
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&content)
                .map_err(|e| IngestionError::extraction(e.to_string()))
        })
        .await
        .map_err(|e| IngestionError::extraction(format!("pdf task failed: {}", e)))??;

        let page_count = text.matches('\x0C').count().max(1);
        debug!(page_count, "Extracted pdf text");

        let blank = text.trim().is_empty();
        let result = ExtractionResult::new(text, self.name())
            .with_metadata("page_count", serde_json::json!(page_count));
        if blank {
            Ok(result.with_warning("pdf has no text layer"))
        } else {
            Ok(result)
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

/// Image OCR through the `tesseract` command line tool
#[derive(Debug, Clone)]
pub struct OcrExtractor {
    binary: PathBuf,
    language: String,
    timeout: Duration,
}

impl OcrExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            language: "eng".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(&config.tesseract_path)
            .with_language(config.ocr_language.clone())
            .with_timeout(config.timeout())
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OcrExtractor {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        let child = tokio::process::Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                IngestionError::OcrFailed(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| IngestionError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IngestionError::OcrFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(chars = text.len(), language = %self.language, "OCR completed");

        Ok(ExtractionResult::new(text, self.name())
            .with_metadata("language", serde_json::json!(self.language)))
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg"]
    }

    fn name(&self) -> &'static str {
        "ocr"
    }
}

/// Registry of text extractors keyed by extension
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: BTreeMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with every compiled-in extractor
    pub fn with_defaults(config: &ExtractionConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlainTextExtractor::new()));
        #[cfg(feature = "docx")]
        registry.register(Arc::new(DocxExtractor::new()));
        #[cfg(feature = "pdf")]
        registry.register(Arc::new(PdfExtractor::new()));
        registry.register(Arc::new(OcrExtractor::from_config(config)));
        registry
    }

    /// Register an extractor for each of its extensions; later
    /// registrations replace earlier ones.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        for ext in extractor.extensions() {
            self.extractors.insert(ext.to_string(), Arc::clone(&extractor));
        }
    }

    /// Get extractor for an extension, with or without the leading dot
    pub fn get(&self, extension: &str) -> Option<Arc<dyn TextExtractor>> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        self.extractors.get(&ext).cloned()
    }

    /// Like [`get`](Self::get), but an unknown extension is an error.
    pub fn resolve(&self, extension: &str) -> Result<Arc<dyn TextExtractor>> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        self.extractors
            .get(&ext)
            .cloned()
            .ok_or(IngestionError::UnsupportedType(ext))
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        self.extractors.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.extractors.iter().map(|(ext, e)| (ext, e.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_plain_text_extractor() {
        let file = write_temp(".txt", b"Hello, world!");

        let result = PlainTextExtractor::new().extract(file.path()).await.unwrap();

        assert_eq!(result.text, "Hello, world!");
        assert_eq!(result.extractor, "plain_text");
        assert_eq!(result.encoding.as_deref(), Some("utf-8"));
        assert_eq!(result.word_count(), 2);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_windows_1252_fallback() {
        // "café" with 0xE9 as the Windows-1252 e-acute
        let file = write_temp(".txt", b"caf\xe9 menu");

        let result = PlainTextExtractor::new().extract(file.path()).await.unwrap();

        assert_eq!(result.text, "café menu");
        assert_eq!(result.encoding.as_deref(), Some("windows-1252"));
        assert_eq!(result.warnings, vec!["not valid UTF-8, decoded as windows-1252"]);
    }

    #[tokio::test]
    async fn test_plain_text_strips_bom() {
        let file = write_temp(".txt", b"\xef\xbb\xbfnotice");
        let result = PlainTextExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(result.text, "notice");
    }

    #[tokio::test]
    async fn test_plain_text_size_limit() {
        let file = write_temp(".txt", b"0123456789");

        let result = PlainTextExtractor::new()
            .with_max_size(4)
            .extract(file.path())
            .await;

        assert!(matches!(result, Err(IngestionError::ExtractionFailed(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = PlainTextExtractor::new()
            .extract(Path::new("/definitely/not/here.txt"))
            .await;
        assert!(matches!(result, Err(IngestionError::IoError(_))));
    }

    #[cfg(feature = "docx")]
    #[tokio::test]
    async fn test_docx_extractor() {
        use docx_rs::{Docx, Paragraph, Run};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        let file = std::fs::File::create(&path).unwrap();
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Budget review")))
            .add_paragraph(Paragraph::new())
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Invoice "))
                    .add_run(Run::new().add_text("attached")),
            )
            .build()
            .pack(file)
            .unwrap();

        let result = DocxExtractor::new().extract(&path).await.unwrap();

        assert_eq!(result.text, "Budget review\nInvoice attached");
        assert_eq!(result.metadata["paragraph_count"], serde_json::json!(2));
    }

    #[cfg(feature = "docx")]
    #[tokio::test]
    async fn test_docx_rejects_garbage() {
        let file = write_temp(".docx", b"not a zip archive");
        let result = DocxExtractor::new().extract(file.path()).await;
        assert!(matches!(result, Err(IngestionError::ExtractionFailed(_))));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_pdf_rejects_garbage() {
        let file = write_temp(".pdf", b"%PDF-garbage");
        let result = PdfExtractor::new().extract(file.path()).await;
        assert!(matches!(result, Err(IngestionError::ExtractionFailed(_))));
    }

    #[tokio::test]
    async fn test_ocr_missing_binary() {
        let file = write_temp(".png", b"\x89PNG");

        let result = OcrExtractor::new("/nonexistent/tesseract-binary")
            .extract(file.path())
            .await;

        assert!(matches!(result, Err(IngestionError::OcrFailed(_))));
    }

    #[test]
    fn test_ocr_from_config() {
        let config = ExtractionConfig {
            tesseract_path: "/usr/local/bin/tesseract".to_string(),
            ocr_language: "deu".to_string(),
            timeout_ms: 1500,
        };
        let ocr = OcrExtractor::from_config(&config);
        assert_eq!(ocr.binary, PathBuf::from("/usr/local/bin/tesseract"));
        assert_eq!(ocr.language, "deu");
        assert_eq!(ocr.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_registry_lookup_by_extension() {
        let registry = ExtractorRegistry::with_defaults(&ExtractionConfig::default());

        assert_eq!(registry.get("txt").unwrap().name(), "plain_text");
        assert_eq!(registry.get(".TXT").unwrap().name(), "plain_text");
        assert_eq!(registry.get("JPEG").unwrap().name(), "ocr");
        assert_eq!(registry.get("png").unwrap().name(), "ocr");
        assert!(registry.get("exe").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_registry_resolve_unknown_extension() {
        let registry = ExtractorRegistry::with_defaults(&ExtractionConfig::default());

        assert_eq!(registry.resolve(" .Txt ").unwrap().name(), "plain_text");
        match registry.resolve(".Exe") {
            Err(IngestionError::UnsupportedType(ext)) => assert_eq!(ext, "exe"),
            other => panic!("expected UnsupportedType, got {:?}", other.map(|e| e.name())),
        }
    }

    #[cfg(all(feature = "pdf", feature = "docx"))]
    #[test]
    fn test_registry_default_extensions() {
        let registry = ExtractorRegistry::with_defaults(&ExtractionConfig::default());
        assert_eq!(
            registry.extensions(),
            vec!["docx", "jpeg", "jpg", "pdf", "png", "txt"]
        );
    }

    #[test]
    fn test_registry_later_registration_wins() {
        struct Upper;

        #[async_trait]
        impl TextExtractor for Upper {
            async fn extract(&self, _path: &Path) -> Result<ExtractionResult> {
                Ok(ExtractionResult::new("UPPER", "upper"))
            }
            fn extensions(&self) -> &'static [&'static str] {
                &["txt"]
            }
            fn name(&self) -> &'static str {
                "upper"
            }
        }

        let mut registry = ExtractorRegistry::new();
        registry.register(Arc::new(PlainTextExtractor::new()));
        registry.register(Arc::new(Upper));
        assert_eq!(registry.get("txt").unwrap().name(), "upper");
    }
}
