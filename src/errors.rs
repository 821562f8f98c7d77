use std::path::PathBuf;
use thiserror::Error;

/// Errors detected before any network interaction. They abort the run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration file missing: {}. A template has been written, please fill it in and run again.", .path.display())]
    ConfigurationMissing { path: PathBuf },

    #[error("Configuration is malformed: {0}")]
    ConfigurationMalformed(String),

    #[error("Not a site project: production directory {} does not exist. Build the site first.", .0.display())]
    NotAProjectDirectory(PathBuf),
}

/// Error kinds surfaced by the object store collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transient timeout. The caller retries the identical request.
    #[error("Store request timed out: {0}")]
    Timeout(String),

    /// The store answered but refused the operation. Reported per item.
    #[error("Store rejected the request: {0}")]
    Rejected(String),

    /// Anything else. Aborts the run.
    #[error("Store error: {0}")]
    Unclassified(String),
}
