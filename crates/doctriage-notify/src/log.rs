//! Log-based department routing notifications.

use async_trait::async_trait;
use doctriage_core::{DocumentRecord, NotificationReceipt, Notifier, Priority};
use tracing::{info, warn};

/// Announces each document and the department it was routed to.
///
/// High priority documents are logged at `warn` so they stand out.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, record: &DocumentRecord) -> doctriage_core::Result<NotificationReceipt> {
        let message = record.category.routing_message(&record.filename);
        let department = record.category.department().unwrap_or("unassigned");

        if record.priority == Priority::High {
            warn!(
                document_id = %record.id,
                filename = %record.filename,
                category = %record.category,
                priority = %record.priority,
                department,
                uploaded_at = %record.uploaded_at,
                "{}",
                message
            );
        } else {
            info!(
                document_id = %record.id,
                filename = %record.filename,
                category = %record.category,
                priority = %record.priority,
                department,
                uploaded_at = %record.uploaded_at,
                "{}",
                message
            );
        }

        Ok(NotificationReceipt::new(self.name(), message))
    }
}
