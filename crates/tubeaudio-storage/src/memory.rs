//! In-memory object store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Object store keeping everything in a shared map.
///
/// Clones share the same map.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    base_url: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::default(),
            base_url: "memory://objects".to_string(),
        }
    }

    /// Fetch a copy of a stored object.
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::upload_failed("store lock poisoned"))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        if self.get(key).is_none() {
            return Err(StorageError::presign_failed(format!("no object at {}", key)));
        }
        Ok(format!(
            "{}/{}?expires={}",
            self.base_url,
            key,
            expires_in.as_secs()
        ))
    }
}
