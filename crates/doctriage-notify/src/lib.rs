//! Notifications for newly classified documents
//!
//! This crate provides the notification side of the upload flow:
//! - A log notifier announcing which department a document was routed to
//! - A webhook notifier posting signed document views to an HTTP endpoint
//! - A chain that fans a record out to every configured notifier
//!
//! Notification is best effort. The chain logs and collects failures and
//! never hands them back to the upload caller as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use doctriage_notify::{LogNotifier, NotifierChain, WebhookNotifier};
//! use std::sync::Arc;
//!
//! let chain = NotifierChain::new()
//!     .with(Arc::new(LogNotifier::new()))
//!     .with(Arc::new(WebhookNotifier::new("https://hooks.example.com/docs", Some("secret".into()))?));
//!
//! let report = chain.notify_all(&record).await;
//! assert!(report.failures.is_empty());
//! ```

pub mod chain;
pub mod log;
pub mod signature;
pub mod webhook;

pub use chain::{NotificationFailure, NotificationReport, NotifierChain};
pub use log::LogNotifier;
pub use signature::{WebhookSigner, WebhookVerifier, SIGNATURE_HEADER};
pub use webhook::WebhookNotifier;

use thiserror::Error;

/// Notification errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for notification operations
pub type Result<T> = std::result::Result<T, NotifyError>;

impl From<NotifyError> for doctriage_core::AppError {
    fn from(err: NotifyError) -> Self {
        doctriage_core::AppError::notification(err.to_string())
    }
}
