//! Storage backends for document records and uploaded files.

pub mod blob;
pub mod file;
pub mod memory;

pub use blob::{sanitize_filename, LocalBlobStore};
pub use file::JsonFileRepository;
pub use memory::InMemoryRepository;

use doctriage_core::{DocumentFilter, DocumentRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid blob path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for doctriage_core::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => doctriage_core::AppError::not_found(what),
            other => doctriage_core::AppError::storage(other.to_string()),
        }
    }
}

/// Applies `filter` and orders the result newest first.
///
/// Records uploaded at the same instant keep reverse insertion order.
pub(crate) fn select(records: &[DocumentRecord], filter: DocumentFilter) -> Vec<DocumentRecord> {
    let mut selected: Vec<DocumentRecord> = records
        .iter()
        .rev()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    selected
}
