//! # Doctriage Classify
//!
//! Category and priority resolution for uploaded documents.
//!
//! A probabilistic primary classifier proposes a category, a priority and a
//! summary. Two deterministic keyword passes then correct it:
//!
//! - **Category override**: the category with the most distinct keyword hits
//!   (in text or filename) replaces the primary suggestion once it reaches
//!   two hits. Ties go to the earliest category in the rule table.
//! - **Priority escalation**: any high-tier trigger forces `High`, else any
//!   medium-tier trigger forces `Medium`, else the primary suggestion stands.
//!
//! When the primary classifier fails, times out or answers garbage, the
//! pipeline substitutes a local fallback (`Other`, `Low`, word-count summary)
//! and flags the result as degraded. Classification itself never fails.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use doctriage_classify::{
//!     ClassificationInput, ClassificationPipeline, NoopClassifier, PipelineConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = ClassificationPipeline::new(Arc::new(NoopClassifier), PipelineConfig::default());
//!
//!     let result = pipeline
//!         .classify(&ClassificationInput::new("Urgent equipment repair request", "pump.txt"))
//!         .await;
//!     println!("{} / {}", result.category, result.priority);
//! }
//! ```

pub mod category;
pub mod classifier;
pub mod error;
pub mod gemini;
pub mod pipeline;
pub mod priority;
pub mod rules;

pub use category::{CategoryResolver, MIN_OVERRIDE_MATCHES};
pub use classifier::{ClassifierOutput, NoopClassifier, PrimaryClassifier, DEFAULT_SUMMARY};
pub use error::{ClassifyError, Result};
pub use gemini::{GeminiClassifier, GeminiClassifierBuilder};
pub use pipeline::{
    ClassificationInput, ClassificationPipeline, ClassificationResult, PipelineConfig,
};
pub use priority::PriorityResolver;
pub use rules::{CategoryRule, KeywordRuleSet, PriorityTier};
