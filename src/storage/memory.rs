use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{key_from_url, ObjectStore, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Keeps objects in process memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    public_prefix: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new(public_prefix: impl Into<String>) -> Self {
        Self {
            public_prefix: public_prefix.into(),
            objects: RwLock::default(),
        }
    }

    pub async fn get(&self, url_or_key: &str) -> Option<StoredObject> {
        let key = key_from_url(url_or_key, &self.public_prefix).ok()?;
        self.objects.read().await.get(&key).cloned()
    }

    pub async fn contains(&self, url_or_key: &str) -> bool {
        self.get(url_or_key).await.is_some()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<String> {
        let key = key_from_url(key, &self.public_prefix)?;
        let url = self.public_url(&key);
        self.objects.write().await.insert(
            key,
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(url)
    }

    async fn delete(&self, url_or_key: &str) -> StorageResult<()> {
        let key = key_from_url(url_or_key, &self.public_prefix)?;
        match self.objects.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key)),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), key)
    }
}
