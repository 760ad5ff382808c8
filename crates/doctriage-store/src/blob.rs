//! Local-disk storage for uploaded files.

use async_trait::async_trait;
use doctriage_core::{BlobStore, DocumentId};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::StoreError;

/// Replaces every character outside ASCII alphanumerics, `.`, `-` and `_`
/// with `_`. Leading dots are replaced too, so the result is never a
/// hidden or relative path component.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let leading_dots = sanitized.len() - sanitized.trim_start_matches('.').len();
    sanitized.replace_range(..leading_dots, &"_".repeat(leading_dots));

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Blob store writing `<root>/<id>-<sanitized filename>`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only plain paths under the root are readable.
    fn check_path(&self, path: &Path) -> crate::Result<()> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes || !path.starts_with(&self.root) {
            return Err(StoreError::InvalidPath(path.display().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        id: &DocumentId,
        filename: &str,
        bytes: &[u8],
    ) -> doctriage_core::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(StoreError::from)?;

        let path = self
            .root
            .join(format!("{}-{}", id, sanitize_filename(filename)));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(StoreError::from)?;

        debug!(path = %path.display(), size = bytes.len(), "Stored upload");
        Ok(path)
    }

    async fn open(&self, path: &Path) -> doctriage_core::Result<Vec<u8>> {
        self.check_path(path)?;

        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.display().to_string()).into())
            }
            Err(e) => Err(StoreError::from(e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("Q3 report (final).pdf"), "Q3_report__final_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\memo.docx"), "memo.docx");
        assert_eq!(sanitize_filename(".env"), "_env");
        assert_eq!(sanitize_filename("..."), "___");
        assert_eq!(sanitize_filename("résumé.txt"), "r_sum_.txt");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("dir/"), "upload");
    }

    #[tokio::test]
    async fn test_put_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("uploads"));
        let id = DocumentId::new();

        let path = store.put(&id, "memo 1.txt", b"hello").await.unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("{}-memo_1.txt", id)
        );
        assert!(path.starts_with(store.root()));
        assert_eq!(store.open(&path).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let err = store.open(&dir.path().join("gone.txt")).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_outside_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("uploads"));

        let outside = dir.path().join("uploads").join("..").join("secret.txt");
        let err = store.open(&outside).await.unwrap_err();
        assert!(matches!(err, doctriage_core::AppError::Storage(_)));

        let err = store.open(Path::new("/etc/hostname")).await.unwrap_err();
        assert!(matches!(err, doctriage_core::AppError::Storage(_)));
    }
}
