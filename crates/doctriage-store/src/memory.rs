//! In-memory document repository
//!
//! Used for development, tests, and deployments that do not need records to
//! survive a restart.

use async_trait::async_trait;
use doctriage_core::{DocumentFilter, DocumentId, DocumentRecord, DocumentRepository};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Document repository backed by a vector behind a lock
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<RwLock<Vec<DocumentRecord>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create pre-populated with `records`, in insertion order
    pub fn with_records(records: Vec<DocumentRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn insert(&self, record: DocumentRecord) -> doctriage_core::Result<()> {
        let mut records = self.records.write().await;
        debug!(id = %record.id, filename = %record.filename, "Storing document record");
        records.push(record);
        Ok(())
    }

    async fn list(&self, filter: DocumentFilter) -> doctriage_core::Result<Vec<DocumentRecord>> {
        let records = self.records.read().await;
        Ok(crate::select(&records, filter))
    }

    async fn get(&self, id: &DocumentId) -> doctriage_core::Result<Option<DocumentRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == *id).cloned())
    }
}
