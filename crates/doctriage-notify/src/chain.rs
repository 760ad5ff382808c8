//! Fan-out over several notifiers.

use doctriage_core::{DocumentRecord, NotificationReceipt, Notifier};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// A notifier that failed, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationFailure {
    pub notifier: String,
    pub error: String,
}

/// Outcome of notifying every notifier in a chain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationReport {
    pub receipts: Vec<NotificationReceipt>,
    pub failures: Vec<NotificationFailure>,
}

impl NotificationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs every notifier in registration order.
#[derive(Clone, Default)]
pub struct NotifierChain {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn push(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Notifies every notifier; a failure never stops the rest.
    pub async fn notify_all(&self, record: &DocumentRecord) -> NotificationReport {
        let mut report = NotificationReport::default();

        for notifier in &self.notifiers {
            match notifier.notify(record).await {
                Ok(receipt) => {
                    debug!(notifier = notifier.name(), document_id = %record.id, "Notification sent");
                    report.receipts.push(receipt);
                }
                Err(err) => {
                    warn!(
                        notifier = notifier.name(),
                        document_id = %record.id,
                        error = %err,
                        "Notification failed"
                    );
                    report.failures.push(NotificationFailure {
                        notifier: notifier.name().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for NotifierChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierChain")
            .field("notifiers", &self.names())
            .finish()
    }
}
