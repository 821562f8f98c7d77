// sitesync/src/sync/mod.rs
pub(crate) mod confirm;
pub(crate) mod executor;
pub(crate) mod local_files;
pub(crate) mod metadata;
pub(crate) mod plan;
pub(crate) mod remote;

use anyhow::Result;
use std::io::{BufRead, Write};
use std::time::Duration;

use crate::cdn::CdnInvalidator;
use crate::config::{CONFIGURATION_FILE, SyncConfig};
use crate::errors::SyncError;
use crate::store::ObjectStore;
use confirm::DeletionConfirmer;
use executor::{SyncExecutor, TransferResult};
use plan::{DeployScope, compute_plan, resolve_scope};

/// What happened to each file during one run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub uploaded: Vec<String>,
    pub upload_failures: Vec<String>,
    pub deleted: Vec<String>,
    pub delete_failures: Vec<String>,
    pub kept: Vec<String>,
}

impl SyncReport {
    fn record_upload(&mut self, result: TransferResult) {
        if result.succeeded() {
            self.uploaded.push(result.key);
        } else {
            self.upload_failures.push(result.key);
        }
    }

    fn record_delete(&mut self, result: TransferResult) {
        if result.succeeded() {
            self.deleted.push(result.key);
        } else {
            self.delete_failures.push(result.key);
        }
    }
}

/// Public entry point for the sync process.
///
/// 1. Resolves the deploy scope and enumerates local files.
/// 2. Reads the remote key set, creating the bucket if needed.
/// 3. Uploads every local file.
/// 4. For full-site deploys, offers to delete remote keys absent locally.
/// 5. Invalidates the CDN distribution when one is configured.
pub async fn run_sync_flow<S, C, R, W>(
    config: &SyncConfig,
    campaign: Option<&str>,
    store: &S,
    cdn: &C,
    confirmer: &mut DeletionConfirmer<R, W>,
    retry_delay: Duration,
) -> Result<SyncReport>
where
    S: ObjectStore,
    C: CdnInvalidator,
    R: BufRead,
    W: Write,
{
    let scope = resolve_scope(config, campaign).ok_or_else(|| {
        SyncError::ConfigurationMalformed(format!(
            "campaign '{}' is not defined in {}",
            campaign.unwrap_or_default(),
            CONFIGURATION_FILE
        ))
    })?;

    let bucket = config.credentials.bucket_name.as_str();
    let site_dir = config.production_directory.as_path();

    let local = match scope {
        DeployScope::FullSite => {
            println!("🚀 Deploying Files = \"{}/*\" to {}", site_dir.display(), bucket);
            local_files::enumerate_local_files(site_dir, &SyncConfig::default_include()?, &config.exclude_files)?
        }
        DeployScope::Campaign { name, campaign } => {
            println!("🚀 Deploying Campaign = \"{}\" to {}", name, bucket);
            let mut exclude = campaign.exclude_files.clone();
            exclude.extend(config.exclude_files.iter().cloned());
            local_files::enumerate_local_files(site_dir, &campaign.include_files, &exclude)?
        }
    };
    tracing::info!(local_files = local.len(), "enumerated local files");

    let remote_keys = remote::read_remote_keys(store, bucket).await?;
    let plan = compute_plan(local, &remote_keys, scope);

    let executor = SyncExecutor::new(
        store,
        bucket,
        site_dir,
        &config.production_directory_name,
        &config.headers,
        retry_delay,
    );
    let mut report = SyncReport::default();

    for key in &plan.upload {
        report.record_upload(executor.upload(key).await?);
    }

    for key in &plan.delete {
        if confirmer.confirm(key, &config.production_directory_name)? {
            report.record_delete(executor.delete(key).await?);
        } else {
            report.kept.push(key.clone());
        }
    }

    if !report.kept.is_empty() {
        tracing::info!(kept = report.kept.len(), "left stale remote files in place");
    }

    if let Some(distribution_id) = &config.cloudfront_distribution_id {
        cdn.invalidate(&config.credentials, bucket, distribution_id).await;
    }

    let domain = config
        .www
        .clone()
        .unwrap_or_else(|| format!("http://{}.s3.amazonaws.com/index.html", bucket));
    println!(
        "✅ Done! {} uploaded, {} failed, {} deleted. Go visit: {}",
        report.uploaded.len(),
        report.upload_failures.len() + report.delete_failures.len(),
        report.deleted.len(),
        domain
    );

    Ok(report)
}
