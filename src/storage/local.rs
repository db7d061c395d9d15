use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::{key_from_url, ObjectStore, StorageError, StorageResult};

/// Filesystem-backed store; files are served back by the HTTP layer under
/// `public_prefix`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
    public_prefix: String,
}

impl LocalObjectStore {
    pub async fn new(base_path: PathBuf, public_prefix: impl Into<String>) -> StorageResult<Self> {
        fs::create_dir_all(&base_path)
            .await
            .map_err(|source| StorageError::Io {
                key: base_path.display().to_string(),
                source,
            })?;

        info!(path = %base_path.display(), "Upload store initialized");

        Ok(Self {
            base_path,
            public_prefix: public_prefix.into(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Joins a key onto the base directory, refusing anything that could
    /// escape it.
    fn safe_path(&self, key: &str) -> StorageResult<PathBuf> {
        let mut resolved = self.base_path.clone();
        for component in Path::new(key).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                _ => return Err(StorageError::InvalidKey(key.to_string())),
            }
        }
        if resolved == self.base_path {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<String> {
        let path = self.safe_path(key)?;
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let size = bytes.len();
        fs::write(&path, bytes).await.map_err(io_err)?;

        debug!(key, size, content_type, "Stored object");
        Ok(self.public_url(key))
    }

    async fn delete(&self, url_or_key: &str) -> StorageResult<()> {
        let key = key_from_url(url_or_key, &self.public_prefix)?;
        let path = self.safe_path(&key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(key)),
            Err(source) => Err(StorageError::Io { key, source }),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (LocalObjectStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf(), "/uploads")
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn put_then_delete_by_url() {
        let (store, dir) = test_store().await;
        let url = store
            .put("projects/1-abc-shot.png", b"png-bytes".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "/uploads/projects/1-abc-shot.png");
        assert!(dir.path().join("projects/1-abc-shot.png").exists());

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join("projects/1-abc-shot.png").exists());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (store, _dir) = test_store().await;
        let err = store.delete("/uploads/profiles/nope.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let (store, _dir) = test_store().await;
        assert!(store.put("../escape.txt", vec![1], "text/plain").await.is_err());
        assert!(store.put("/abs.txt", vec![1], "text/plain").await.is_err());
    }
}
