//! Uploaded file storage.
//!
//! A small trait seam over "write these bytes under this name" so the
//! upload handler does not care where files land. The only production
//! implementation writes to a local directory which the router also
//! serves statically under `/uploads`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::{Error, Result};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob under the given file name, overwriting any existing
    /// blob with that name.
    async fn put(&self, filename: &str, data: Bytes) -> Result<()>;
}

/// Stores blobs as plain files in a directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| Error::Internal {
                operation: format!("creating upload directory {}: {e}", root.display()),
            })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStore for DiskStore {
    async fn put(&self, filename: &str, data: Bytes) -> Result<()> {
        // Names are server-generated UUIDs, but refuse path separators
        // anyway so a bug upstream cannot escape the upload directory.
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(Error::BadRequest {
                message: "Invalid file name".to_string(),
            });
        }

        let path = self.root.join(filename);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| Error::Internal {
                operation: format!("writing upload {}: {e}", path.display()),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path()).await.unwrap();

        store
            .put("photo.png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();

        let written = tokio::fs::read(dir.path().join("photo.png")).await.unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn put_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path()).await.unwrap();

        for name in ["../escape.png", "a/b.png", "..\\up.png"] {
            let err = store.put(name, Bytes::new()).await.unwrap_err();
            assert!(matches!(err, Error::BadRequest { .. }), "{name}");
        }
    }

    #[tokio::test]
    async fn new_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = DiskStore::new(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }
}
