// sitesync/src/sync/remote.rs
use anyhow::{Context, Result};

use crate::store::ObjectStore;

/// Lists every key in `bucket`, creating the bucket first when it does not exist.
pub async fn read_remote_keys<S: ObjectStore>(store: &S, bucket: &str) -> Result<Vec<String>> {
    let buckets = store
        .list_buckets()
        .await
        .context("Failed to list buckets")?;
    if !buckets.iter().any(|name| name == bucket) {
        println!("🪣 Creating bucket {}", bucket);
        store
            .create_bucket(bucket)
            .await
            .with_context(|| format!("Failed to create bucket {}", bucket))?;
    }

    let keys = store
        .list_objects(bucket)
        .await
        .with_context(|| format!("Failed to list objects in bucket {}", bucket))?;
    tracing::info!(bucket, remote_objects = keys.len(), "read remote state");
    Ok(keys)
}
