//! Classifier error types

use std::time::Duration;
use thiserror::Error;

/// Reasons a primary classifier call can fail.
///
/// None of these escape [`crate::ClassificationPipeline::classify`]; the
/// pipeline converts every one of them into the fallback result.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Classifier credential is not configured")]
    MissingCredential,

    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Classifier returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),
}

impl ClassifyError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

impl From<reqwest::Error> for ClassifyError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry credentials; never keep them in the error.
        Self::Http(err.without_url())
    }
}

/// Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifyError>;

impl From<ClassifyError> for doctriage_core::AppError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::MissingCredential => {
                doctriage_core::AppError::internal("classifier credential is not configured")
            }
            other => doctriage_core::AppError::internal(other.to_string()),
        }
    }
}
