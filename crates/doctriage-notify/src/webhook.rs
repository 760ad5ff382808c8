//! Outbound webhook notifications
//!
//! Posts the public document view as JSON. When a secret is configured the
//! request carries an HMAC signature in [`SIGNATURE_HEADER`]. Delivery is a
//! single attempt; retries are left to the receiving side.

use async_trait::async_trait;
use doctriage_core::{DocumentRecord, NotificationConfig, NotificationReceipt, Notifier};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::signature::{WebhookSigner, SIGNATURE_HEADER};
use crate::{NotifyError, Result};

/// Event name sent in the `X-Doctriage-Event` header.
pub const EVENT_DOCUMENT_PROCESSED: &str = "document.processed";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier posting each document to an HTTP endpoint
#[derive(Debug)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    signer: Option<WebhookSigner>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, secret: Option<String>) -> Result<Self> {
        Self::with_timeout(url, secret, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(NotifyError::InvalidUrl(url));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("doctriage-webhook/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url,
            signer: secret
                .filter(|s| !s.trim().is_empty())
                .map(WebhookSigner::new),
        })
    }

    /// Builds a notifier when a webhook URL is configured.
    pub fn from_config(config: &NotificationConfig) -> Result<Option<Self>> {
        match config.webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                Self::new(url, config.webhook_secret.clone()).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    #[instrument(skip(self, record), fields(url = %self.url, document_id = %record.id))]
    async fn deliver(&self, record: &DocumentRecord) -> Result<NotificationReceipt> {
        let payload = serde_json::to_vec(&record.view())?;

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-Doctriage-Event", EVENT_DOCUMENT_PROCESSED);

        if let Some(signer) = &self.signer {
            request = request.header(SIGNATURE_HEADER, signer.sign_now(&payload)?);
        }

        let response = request.body(payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Webhook delivered");

        Ok(NotificationReceipt::new(
            "webhook",
            format!("Delivered to {} ({})", self.url, status.as_u16()),
        ))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, record: &DocumentRecord) -> doctriage_core::Result<NotificationReceipt> {
        Ok(self.deliver(record).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        let err = WebhookNotifier::new("ftp://example.com", None).unwrap_err();
        assert!(matches!(err, NotifyError::InvalidUrl(_)));
    }

    #[test]
    fn test_blank_secret_is_unsigned() {
        let notifier = WebhookNotifier::new("http://localhost:1", Some("  ".into())).unwrap();
        assert!(!notifier.is_signed());

        let notifier = WebhookNotifier::new("http://localhost:1", Some("s3cret".into())).unwrap();
        assert!(notifier.is_signed());
    }

    #[test]
    fn test_from_config() {
        let none = WebhookNotifier::from_config(&NotificationConfig::default()).unwrap();
        assert!(none.is_none());

        let config = NotificationConfig {
            webhook_url: Some("https://hooks.example.com/docs".to_string()),
            webhook_secret: None,
        };
        let notifier = WebhookNotifier::from_config(&config).unwrap().unwrap();
        assert_eq!(notifier.url(), "https://hooks.example.com/docs");
    }

    #[test]
    fn test_debug_hides_secret() {
        let notifier =
            WebhookNotifier::new("http://localhost:1", Some("very-secret".into())).unwrap();
        assert!(!format!("{:?}", notifier).contains("very-secret"));
    }
}
