// sitesync/src/store/memory.rs
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use super::{ObjectMetadata, ObjectStore};
use crate::errors::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub metadata: ObjectMetadata,
}

/// Scripted in-process store used by the sync tests.
#[derive(Default)]
pub struct MemoryStore {
    pub buckets: Mutex<BTreeMap<String, BTreeMap<String, StoredObject>>>,
    /// Remaining timeouts to raise per key before the request goes through.
    pub timeouts: Mutex<HashMap<String, usize>>,
    pub refused: HashSet<String>,
    pub rejected: HashSet<String>,
    pub broken: HashSet<String>,
    pub put_attempts: Mutex<Vec<String>>,
    pub created_buckets: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_objects(bucket: &str, keys: &[&str]) -> Self {
        let store = MemoryStore::default();
        let objects = keys
            .iter()
            .map(|k| {
                (
                    k.to_string(),
                    StoredObject { body: Vec::new(), metadata: ObjectMetadata::new() },
                )
            })
            .collect();
        store.buckets.lock().unwrap().insert(bucket.to_string(), objects);
        store
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.buckets.lock().unwrap().get(bucket)?.get(key).cloned()
    }

    fn scripted_failure(&self, key: &str) -> Result<bool, StoreError> {
        if let Some(remaining) = self.timeouts.lock().unwrap().get_mut(key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::Timeout(format!("{} timed out", key)));
            }
        }
        if self.broken.contains(key) {
            return Err(StoreError::Unclassified(format!("{} broke the connection", key)));
        }
        if self.rejected.contains(key) {
            return Err(StoreError::Rejected(format!("{} access denied", key)));
        }
        Ok(!self.refused.contains(key))
    }
}

impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.buckets.lock().unwrap().keys().cloned().collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        self.created_buckets.lock().unwrap().push(bucket.to_string());
        self.buckets.lock().unwrap().entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.keys(bucket))
    }

    async fn put_object(
        &self,
        key: &str,
        source: &Path,
        bucket: &str,
        metadata: &ObjectMetadata,
    ) -> Result<bool, StoreError> {
        self.put_attempts.lock().unwrap().push(key.to_string());
        if !self.scripted_failure(key)? {
            return Ok(false);
        }
        let body = tokio::fs::read(source)
            .await
            .map_err(|e| StoreError::Unclassified(e.to_string()))?;
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), StoredObject { body, metadata: metadata.clone() });
        Ok(true)
    }

    async fn delete_object(&self, key: &str, bucket: &str) -> Result<bool, StoreError> {
        if !self.scripted_failure(key)? {
            return Ok(false);
        }
        if let Some(objects) = self.buckets.lock().unwrap().get_mut(bucket) {
            objects.remove(key);
        }
        Ok(true)
    }
}
