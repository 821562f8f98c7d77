//! Static site deploy tool
//!
//! Uploads a generated site directory to an S3 bucket, optionally removes
//! stale remote files and invalidates the CloudFront distribution in front of it.

// sitesync/src/main.rs
mod cdn;
mod config;
mod errors;
mod store;
mod sync;

use anyhow::{Context, Result};
use cdn::cloudfront::CloudFrontInvalidator;
use clap::Parser;
use config::SyncConfig;
use std::io::stdin;
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use store::s3::S3Store;
use sync::confirm::DeletionConfirmer;
use sync::executor::RETRY_DELAY;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitesync")]
#[command(about = "Deploy a generated static site to S3", long_about = None)]
struct Cli {
    /// Campaign from the configuration to deploy instead of the whole site
    campaign: Option<String>,

    /// Directory holding the site configuration files
    #[arg(short = 'C', long, default_value = ".")]
    project_dir: PathBuf,
}

/// Main entry point for the deploy tool
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitesync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run_app(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let sync_config = SyncConfig::load_from_project(&cli.project_dir).with_context(|| {
        format!(
            "Failed to load site configuration from {}",
            cli.project_dir.display()
        )
    })?;

    let store = S3Store::connect(&sync_config.credentials).await;
    let mut confirmer = DeletionConfirmer::new(stdin().lock(), stdout());

    sync::run_sync_flow(
        &sync_config,
        cli.campaign.as_deref(),
        &store,
        &CloudFrontInvalidator,
        &mut confirmer,
        RETRY_DELAY,
    )
    .await
    .context("Sync process failed")?;
    Ok(())
}
