// sitesync/src/sync/executor.rs
use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;

use super::metadata::customize_file_metadata;
use crate::config::HeaderRule;
use crate::errors::StoreError;
use crate::store::ObjectStore;

/// Fixed pause before a timed-out request is sent again.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Where a single file transfer stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferState {
    Pending,
    InFlight,
    Retrying,
    Succeeded,
    Failed(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub key: String,
    pub state: TransferState,
    pub attempts: u32,
}

impl TransferResult {
    pub fn succeeded(&self) -> bool {
        self.state == TransferState::Succeeded
    }
}

/// Applies uploads and deletions one file at a time against a connected store.
pub struct SyncExecutor<'a, S> {
    store: &'a S,
    bucket: &'a str,
    site_dir: &'a Path,
    metadata_root: &'a str,
    header_rules: &'a [HeaderRule],
    retry_delay: Duration,
}

impl<'a, S: ObjectStore> SyncExecutor<'a, S> {
    pub fn new(
        store: &'a S,
        bucket: &'a str,
        site_dir: &'a Path,
        metadata_root: &'a str,
        header_rules: &'a [HeaderRule],
        retry_delay: Duration,
    ) -> Self {
        SyncExecutor { store, bucket, site_dir, metadata_root, header_rules, retry_delay }
    }

    pub async fn upload(&self, key: &str) -> Result<TransferResult> {
        let path = self.site_dir.join(key);
        // Rules see the directory as written in the configuration, not the resolved path.
        let metadata_path = format!("{}/{}", self.metadata_root, key);
        let metadata = customize_file_metadata(&metadata_path, self.header_rules);

        let result = self
            .run_with_retry(key, || {
                self.store.put_object(key, &path, self.bucket, &metadata)
            })
            .await
            .with_context(|| format!("Upload of {} aborted", key))?;

        if result.attempts > 1 {
            tracing::info!(key, attempts = result.attempts, "upload went through after retrying");
        }
        if result.succeeded() {
            println!("✅ Upload {}: Success!", key);
        } else {
            println!("❌ Upload {}: FAILURE!", key);
        }
        Ok(result)
    }

    pub async fn delete(&self, key: &str) -> Result<TransferResult> {
        let result = self
            .run_with_retry(key, || self.store.delete_object(key, self.bucket))
            .await
            .with_context(|| format!("Delete of {} aborted", key))?;

        if result.succeeded() {
            println!("🗑️ Delete {}: Success!", key);
        } else {
            println!("❌ Delete {}: FAILURE!", key);
        }
        Ok(result)
    }

    /// Repeats `attempt` for as long as the store reports a timeout. There is no cap.
    async fn run_with_retry<F, Fut>(&self, key: &str, mut attempt: F) -> Result<TransferResult, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, StoreError>>,
    {
        let mut state = TransferState::Pending;
        let mut attempts = 0;

        loop {
            attempts += 1;
            tracing::debug!(key, from = ?state, to = ?TransferState::InFlight, attempts, "sending request");

            state = match attempt().await {
                Ok(true) => TransferState::Succeeded,
                Ok(false) => TransferState::Failed(None),
                Err(StoreError::Rejected(message)) => TransferState::Failed(Some(message)),
                Err(StoreError::Timeout(message)) => {
                    tracing::warn!(
                        key,
                        attempts,
                        "Exception Occurred: {} Retrying in {} seconds...",
                        message,
                        self.retry_delay.as_secs()
                    );
                    sleep(self.retry_delay).await;
                    TransferState::Retrying
                }
                Err(e @ StoreError::Unclassified(_)) => return Err(e),
            };

            if state != TransferState::Retrying {
                if let TransferState::Failed(Some(reason)) = &state {
                    tracing::warn!(key, reason = %reason, "store refused request");
                }
                return Ok(TransferResult { key: key.to_string(), state, attempts });
            }
        }
    }
}
