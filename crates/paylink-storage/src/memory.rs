//! In-process object store used for tests and `STORAGE_BACKEND=memory`.

use crate::traits::{check_key, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryObject {
    content_type: String,
    data: Bytes,
}

/// Blobs held in a shared map. Clones share the same contents.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    base_url: String,
    objects: Arc<RwLock<HashMap<String, MemoryObject>>>,
    failing_names: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        InMemoryStorage {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Make every upload whose key ends with `-{file_name}` fail.
    pub async fn fail_uploads_named(&self, file_name: &str) {
        self.failing_names
            .write()
            .await
            .insert(format!("-{}", file_name));
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn content_type(&self, storage_key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        upsert: bool,
    ) -> StorageResult<StoredObject> {
        check_key(storage_key)?;

        {
            let failing = self.failing_names.read().await;
            if failing.iter().any(|suffix| storage_key.ends_with(suffix)) {
                return Err(StorageError::UploadFailed(format!(
                    "Simulated failure for {}",
                    storage_key
                )));
            }
        }

        let mut objects = self.objects.write().await;
        if !upsert && objects.contains_key(storage_key) {
            return Err(StorageError::AlreadyExists(storage_key.to_string()));
        }
        objects.insert(
            storage_key.to_string(),
            MemoryObject {
                content_type: content_type.to_string(),
                data,
            },
        );

        Ok(StoredObject {
            key: storage_key.to_string(),
            url: format!("{}/{}", self.base_url.trim_end_matches('/'), storage_key),
        })
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        check_key(storage_key)?;
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.data.to_vec())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        check_key(storage_key)?;
        self.objects.write().await.remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        check_key(storage_key)?;
        Ok(self.objects.read().await.contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
