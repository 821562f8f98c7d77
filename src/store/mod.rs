// sitesync/src/store/mod.rs
pub(crate) mod s3;
#[cfg(test)]
pub(crate) mod memory;

use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::StoreError;

/// Header name to value, as resolved for a single object.
pub type ObjectMetadata = BTreeMap<String, String>;

/// The remote object store a site is deployed into.
///
/// One connected instance is used for the whole run.
pub trait ObjectStore {
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError>;

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError>;

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError>;

    /// Stores the file at `source` under `key`. `Ok(false)` means the store
    /// refused the object without raising an error.
    async fn put_object(
        &self,
        key: &str,
        source: &Path,
        bucket: &str,
        metadata: &ObjectMetadata,
    ) -> Result<bool, StoreError>;

    async fn delete_object(&self, key: &str, bucket: &str) -> Result<bool, StoreError>;
}
