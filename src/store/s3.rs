// sitesync/src/store/s3.rs
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use s3::primitives::ByteStream;
use s3::types::{BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl};
use std::path::Path;

use super::{ObjectMetadata, ObjectStore};
use crate::config::StoreCredentials;
use crate::errors::StoreError;
use crate::sync::metadata::ACCESS_KEY;

const DEFAULT_REGION: &str = "us-east-1";

/// S3 (or S3-compatible) object store, connected once per run.
pub struct S3Store {
    client: s3::Client,
    region: String,
}

impl S3Store {
    pub async fn connect(credentials: &StoreCredentials) -> Self {
        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(s3::config::Credentials::new(
                &credentials.access_key_id,
                &credentials.secret_access_key,
                None, // session_token
                None, // expiry
                "Static", // provider_name
            ));
        if let Some(endpoint) = &credentials.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        S3Store {
            client: s3::Client::new(&sdk_config),
            region: credentials.region.clone(),
        }
    }
}

/// Splits SDK failures into the three kinds the sync loop cares about.
fn classify<E, R>(operation: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = format!("{}: {}", operation, DisplayErrorContext(&err));
    match &err {
        SdkError::TimeoutError(_) => StoreError::Timeout(message),
        SdkError::ServiceError(ctx) if ctx.err().code() == Some("RequestTimeout") => {
            StoreError::Timeout(message)
        }
        SdkError::ServiceError(_) => StoreError::Rejected(message),
        _ => StoreError::Unclassified(message),
    }
}

impl ObjectStore for S3Store {
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| classify("ListBuckets", e))?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        // us-east-1 rejects an explicit location constraint.
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|e| classify("CreateBucket", e))?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| classify("ListObjectsV2", e))?;
            keys.extend(page.contents().iter().filter_map(|o| o.key().map(str::to_string)));
        }
        Ok(keys)
    }

    async fn put_object(
        &self,
        key: &str,
        source: &Path,
        bucket: &str,
        metadata: &ObjectMetadata,
    ) -> Result<bool, StoreError> {
        let body = ByteStream::from_path(source).await.map_err(|e| {
            StoreError::Unclassified(format!(
                "Failed to create ByteStream from file {}: {}",
                source.display(),
                e
            ))
        })?;

        let mut request = self.client.put_object().bucket(bucket).key(key).body(body);
        for (header, value) in metadata {
            request = match header.to_ascii_lowercase().as_str() {
                ACCESS_KEY => request.acl(ObjectCannedAcl::from(value.as_str())),
                "content-type" => request.content_type(value),
                "cache-control" => request.cache_control(value),
                "content-encoding" => request.content_encoding(value),
                "content-disposition" => request.content_disposition(value),
                "content-language" => request.content_language(value),
                _ => request.metadata(header, value),
            };
        }

        request
            .send()
            .await
            .map_err(|e| classify("PutObject", e))?;
        Ok(true)
    }

    async fn delete_object(&self, key: &str, bucket: &str) -> Result<bool, StoreError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("DeleteObject", e))?;
        Ok(true)
    }
}
