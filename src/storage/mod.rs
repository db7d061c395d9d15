//! Blob storage for uploaded files.
//!
//! Records only hold the public URL returned by [`ObjectStore::put`]; the same
//! URL (or the bare key) is handed back to [`ObjectStore::delete`] when a file
//! is superseded or its owner is removed.

mod local;
mod memory;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Removes the object addressed by a URL previously returned from `put`
    /// or by its bare key.
    async fn delete(&self, url_or_key: &str) -> StorageResult<()>;

    /// URL under which `key` is served.
    fn public_url(&self, key: &str) -> String;

    /// Whether `url` was issued by this store. Links to anything else are
    /// left alone by cleanup.
    fn owns(&self, url: &str) -> bool {
        let raw = url.trim();
        let base = self.public_url("");
        raw.len() > base.len()
            && raw.starts_with(&base)
            && !raw[base.len()..]
                .split('/')
                .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    }
}

/// Resolves a stored URL back to its object key.
///
/// Accepts absolute URLs (`https://host/uploads/projects/a.png`), prefixed
/// paths (`/uploads/projects/a.png`) and bare keys (`projects/a.png`).
pub fn key_from_url(url_or_key: &str, public_prefix: &str) -> StorageResult<String> {
    let raw = url_or_key.trim();
    let path = match url::Url::parse(raw) {
        Ok(parsed) if parsed.has_host() => parsed.path().to_string(),
        _ => raw.to_string(),
    };

    let prefix = public_prefix.trim_end_matches('/');
    let key = if !prefix.is_empty() && path.starts_with(prefix) {
        &path[prefix.len()..]
    } else {
        path.as_str()
    };
    let key = key.trim_start_matches('/');

    if key.is_empty() || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(StorageError::InvalidKey(url_or_key.to_string()));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_url_shape() {
        for input in [
            "https://cdn.example.com/uploads/projects/1-abc-shot.png",
            "/uploads/projects/1-abc-shot.png",
            "projects/1-abc-shot.png",
        ] {
            assert_eq!(
                key_from_url(input, "/uploads").unwrap(),
                "projects/1-abc-shot.png",
                "{input}"
            );
        }
    }

    struct Prefixed(&'static str);

    #[async_trait]
    impl ObjectStore for Prefixed {
        async fn put(&self, key: &str, _: Vec<u8>, _: &str) -> StorageResult<String> {
            Ok(self.public_url(key))
        }

        async fn delete(&self, _: &str) -> StorageResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("{}/{}", self.0, key)
        }
    }

    #[test]
    fn owns_only_issued_urls() {
        let local = Prefixed("/uploads");
        assert!(local.owns("/uploads/projects/a.png"));
        assert!(!local.owns("https://cdn.other-site.example/uploads/projects/a.png"));
        assert!(!local.owns("projects/a.png"));
        assert!(!local.owns("/uploads/"));
        assert!(!local.owns("/uploads/../etc/passwd"));

        let cdn = Prefixed("https://cdn.example.com/uploads");
        assert!(cdn.owns("https://cdn.example.com/uploads/projects/a.png"));
        assert!(!cdn.owns("https://cdn.other-site.example/uploads/projects/a.png"));
        assert!(!cdn.owns("/uploads/projects/a.png"));
    }

    #[test]
    fn rejects_traversal() {
        assert!(key_from_url("/uploads/../etc/passwd", "/uploads").is_err());
        assert!(key_from_url("", "/uploads").is_err());
    }
}
