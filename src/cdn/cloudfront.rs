// sitesync/src/cdn/cloudfront.rs
use anyhow::{Context, Result};
use aws_sdk_cloudfront as cloudfront;
use chrono::Utc;
use cloudfront::config::Region;
use cloudfront::error::DisplayErrorContext;
use cloudfront::types::{InvalidationBatch, Paths};

use super::CdnInvalidator;
use crate::config::StoreCredentials;

// CloudFront is a global service served out of us-east-1.
const CLOUDFRONT_REGION: &str = "us-east-1";
const INVALIDATE_EVERYTHING: &str = "/*";

pub struct CloudFrontInvalidator;

impl CloudFrontInvalidator {
    async fn create_invalidation(
        &self,
        credentials: &StoreCredentials,
        bucket: &str,
        distribution_id: &str,
    ) -> Result<String> {
        let sdk_config = aws_config::defaults(cloudfront::config::BehaviorVersion::latest())
            .region(Region::new(CLOUDFRONT_REGION))
            .credentials_provider(cloudfront::config::Credentials::new(
                &credentials.access_key_id,
                &credentials.secret_access_key,
                None, // session_token
                None, // expiry
                "Static", // provider_name
            ))
            .load()
            .await;
        let client = cloudfront::Client::new(&sdk_config);

        let paths = Paths::builder()
            .quantity(1)
            .items(INVALIDATE_EVERYTHING)
            .build()
            .context("Failed to build invalidation paths")?;
        let caller_reference = format!("{}-{}", bucket, Utc::now().format("%Y%m%d%H%M%S%3f"));
        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference)
            .build()
            .context("Failed to build invalidation batch")?;

        let output = client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))
            .with_context(|| format!("Failed to invalidate CloudFront distribution {}", distribution_id))?;

        Ok(output
            .invalidation()
            .map(|i| i.id().to_string())
            .unwrap_or_default())
    }
}

impl CdnInvalidator for CloudFrontInvalidator {
    async fn invalidate(&self, credentials: &StoreCredentials, bucket: &str, distribution_id: &str) {
        println!("🌐 Invalidating CloudFront distribution {} for {}", distribution_id, bucket);
        match self.create_invalidation(credentials, bucket, distribution_id).await {
            Ok(id) => {
                tracing::info!(distribution_id, invalidation_id = %id, "created CloudFront invalidation");
                println!("✅ CloudFront invalidation {} created", id);
            }
            Err(e) => {
                tracing::error!(distribution_id, error = %format!("{:#}", e), "CloudFront invalidation failed");
                println!("⚠️ CloudFront invalidation failed: {:#}", e);
            }
        }
    }
}
