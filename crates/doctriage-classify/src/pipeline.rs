//! Classification pipeline.
//!
//! Runs the primary classifier under a timeout, substitutes the fallback on
//! any failure, then applies the category and priority keyword passes.

use doctriage_core::{Category, ClassifierConfig, Priority};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::category::CategoryResolver;
use crate::classifier::{ClassifierOutput, PrimaryClassifier};
use crate::error::ClassifyError;
use crate::priority::PriorityResolver;
use crate::rules::KeywordRuleSet;

/// Text and filename of one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationInput {
    /// Extracted text; may be empty or an extraction placeholder.
    pub text: String,
    pub file_name: String,
}

impl ClassificationInput {
    pub fn new(text: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file_name: file_name.into(),
        }
    }
}

/// Final, fully resolved classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub priority: Priority,
    pub summary: String,
    /// Set when the fallback replaced the primary classifier.
    pub degraded: bool,
}

/// Pipeline tuning
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Characters of text sent to the primary classifier.
    pub max_input_chars: usize,
    pub classifier_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 2000,
            classifier_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&ClassifierConfig> for PipelineConfig {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            max_input_chars: config.max_input_chars,
            classifier_timeout: config.timeout(),
        }
    }
}

/// Text + filename in, category + priority + summary out.
#[derive(Clone)]
pub struct ClassificationPipeline {
    classifier: Arc<dyn PrimaryClassifier>,
    category_resolver: CategoryResolver,
    priority_resolver: PriorityResolver,
    config: PipelineConfig,
}

impl ClassificationPipeline {
    /// Creates a pipeline with the built-in keyword tables.
    pub fn new(classifier: Arc<dyn PrimaryClassifier>, config: PipelineConfig) -> Self {
        Self::with_rules(classifier, KeywordRuleSet::standard(), config)
    }

    pub fn with_rules(
        classifier: Arc<dyn PrimaryClassifier>,
        rules: Arc<KeywordRuleSet>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            classifier,
            category_resolver: CategoryResolver::new(Arc::clone(&rules)),
            priority_resolver: PriorityResolver::new(rules),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Classifies one document. Never fails.
    ///
    /// Dropping the returned future cancels an in-flight classifier call.
    #[instrument(
        skip(self, input),
        fields(file_name = %input.file_name, text_len = input.text.len(), classifier = self.classifier.name())
    )]
    pub async fn classify(&self, input: &ClassificationInput) -> ClassificationResult {
        let (primary, degraded) = match self.call_classifier(input).await {
            Ok(output) => (output, false),
            Err(err) => {
                warn!(error = %err, "Primary classifier failed, using fallback");
                (ClassifierOutput::fallback(&input.text), true)
            }
        };

        let category = self
            .category_resolver
            .resolve(&input.text, &input.file_name, primary.category);
        let priority = self
            .priority_resolver
            .resolve(&input.text, Some(primary.priority));

        info!(
            category = %category,
            priority = %priority,
            primary_category = %primary.category,
            primary_priority = %primary.priority,
            degraded,
            "Document classified"
        );

        ClassificationResult {
            category,
            priority,
            summary: primary.summary,
            degraded,
        }
    }

    async fn call_classifier(
        &self,
        input: &ClassificationInput,
    ) -> Result<ClassifierOutput, ClassifyError> {
        let bounded = truncate_chars(&input.text, self.config.max_input_chars);
        let timeout = self.config.classifier_timeout;

        tokio::time::timeout(timeout, self.classifier.classify(bounded, &input.file_name))
            .await
            .map_err(|_| ClassifyError::Timeout(timeout))?
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
