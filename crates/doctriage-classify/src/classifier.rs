//! Primary classifier contract.
//!
//! A primary classifier is any probabilistic oracle that maps text and a
//! filename to a candidate category, priority and summary. Its output is
//! coerced into the fixed enumerations before the keyword passes see it.

use async_trait::async_trait;
use doctriage_core::{Category, Priority};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, Result};

/// Summary used when a classifier answers without one.
pub const DEFAULT_SUMMARY: &str = "Document processed for categorization.";

/// Already-coerced output of a primary classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    pub category: Category,
    pub priority: Priority,
    pub summary: String,
}

impl ClassifierOutput {
    pub fn new(category: Category, priority: Priority, summary: impl Into<String>) -> Self {
        Self {
            category,
            priority,
            summary: summary.into(),
        }
    }

    /// Deterministic stand-in used whenever the classifier fails.
    pub fn fallback(text: &str) -> Self {
        let words = text.split_whitespace().count();
        Self {
            category: Category::Other,
            priority: Priority::Low,
            summary: format!(
                "Document contains {} words and has been processed for review.",
                words
            ),
        }
    }

    /// Parses a free-form model reply that should contain one JSON object.
    ///
    /// Text around the object is ignored. Unknown or missing fields are
    /// coerced: category to `Other`, priority to `Low`, summary to
    /// [`DEFAULT_SUMMARY`].
    pub fn from_model_reply(reply: &str) -> Result<Self> {
        let json = extract_json_object(reply)
            .ok_or_else(|| ClassifyError::malformed("no JSON object in reply"))?;

        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ClassifyError::malformed(format!("invalid JSON: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| ClassifyError::malformed("reply is not a JSON object"))?;

        let field = |name: &str| {
            object
                .get(name)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        Ok(Self {
            category: field("category")
                .map(Category::parse_lenient)
                .unwrap_or_default(),
            priority: field("priority")
                .map(Priority::parse_lenient)
                .unwrap_or_default(),
            summary: field("summary").unwrap_or(DEFAULT_SUMMARY).to_string(),
        })
    }
}

/// Returns the span from the first `{` to the last `}`, inclusive.
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// First-pass, non-deterministic document classifier.
#[async_trait]
pub trait PrimaryClassifier: Send + Sync {
    /// Classifier name used in logs.
    fn name(&self) -> &'static str;

    /// Classifies already-truncated `text`.
    async fn classify(&self, text: &str, file_name: &str) -> Result<ClassifierOutput>;
}

/// Classifier that is never available; the pipeline always falls back.
#[derive(Debug, Clone, Default)]
pub struct NoopClassifier;

#[async_trait]
impl PrimaryClassifier for NoopClassifier {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn classify(&self, _text: &str, _file_name: &str) -> Result<ClassifierOutput> {
        Err(ClassifyError::unavailable("no primary classifier configured"))
    }
}
