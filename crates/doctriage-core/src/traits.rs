//! Collaborator interfaces consumed by the upload flow.
//!
//! The classification core never touches these; the HTTP layer wires a
//! repository, a blob store and a notifier around it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{Category, DocumentId, DocumentRecord, Priority};

/// Optional filters for listing documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentFilter {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

impl DocumentFilter {
    pub fn matches(&self, record: &DocumentRecord) -> bool {
        self.category.map_or(true, |c| c == record.category)
            && self.priority.map_or(true, |p| p == record.priority)
    }
}

/// Storage for finished document records.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, record: DocumentRecord) -> Result<()>;

    /// Returns matching records, newest first.
    async fn list(&self, filter: DocumentFilter) -> Result<Vec<DocumentRecord>>;

    async fn get(&self, id: &DocumentId) -> Result<Option<DocumentRecord>>;
}

/// Storage for the original uploaded bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists the bytes and returns the location to record.
    async fn put(&self, id: &DocumentId, filename: &str, bytes: &[u8]) -> Result<PathBuf>;

    async fn open(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Outcome of a single notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationReceipt {
    pub channel: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

impl NotificationReceipt {
    pub fn new(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            message: message.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Alerting sink for newly processed documents.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, record: &DocumentRecord) -> Result<NotificationReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: Category, priority: Priority) -> DocumentRecord {
        DocumentRecord {
            id: DocumentId::new(),
            filename: "a.txt".to_string(),
            category,
            priority,
            analysis: String::new(),
            extracted_text: String::new(),
            uploaded_at: Utc::now(),
            size: 0,
            content_type: None,
            blob_path: PathBuf::new(),
            degraded: false,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = DocumentFilter::default();
        assert!(filter.matches(&record(Category::Finance, Priority::Low)));
        assert!(filter.matches(&record(Category::Other, Priority::High)));
    }

    #[test]
    fn test_filter_by_category_and_priority() {
        let filter = DocumentFilter {
            category: Some(Category::Safety),
            priority: Some(Priority::High),
        };
        assert!(filter.matches(&record(Category::Safety, Priority::High)));
        assert!(!filter.matches(&record(Category::Safety, Priority::Low)));
        assert!(!filter.matches(&record(Category::Legal, Priority::High)));
    }
}
