//! JSON-file document repository.
//!
//! The whole record set is kept in memory and rewritten to disk on every
//! insert. Writes go to a sibling temp file that is then renamed over the
//! target, so a crash never leaves a truncated file behind.

use async_trait::async_trait;
use doctriage_core::{DocumentFilter, DocumentId, DocumentRecord, DocumentRepository};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::Result;

pub struct JsonFileRepository {
    path: PathBuf,
    records: RwLock<Vec<DocumentRecord>>,
}

impl JsonFileRepository {
    /// Opens the repository at `path`; a missing file starts empty.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records: Vec<DocumentRecord> = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), count = records.len(), "Loaded document records");

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &[DocumentRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(count = records.len(), bytes = bytes.len(), "Persisted document records");
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for JsonFileRepository {
    async fn insert(&self, record: DocumentRecord) -> doctriage_core::Result<()> {
        let mut records = self.records.write().await;
        records.push(record);

        if let Err(err) = self.persist(&records).await {
            records.pop();
            return Err(err.into());
        }
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
