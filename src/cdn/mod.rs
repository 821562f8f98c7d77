// sitesync/src/cdn/mod.rs
pub(crate) mod cloudfront;

use crate::config::StoreCredentials;

/// Invalidates the CDN cache in front of a bucket once a deploy finishes.
///
/// Implementations own their failure handling; the sync flow never sees an error.
pub trait CdnInvalidator {
    async fn invalidate(&self, credentials: &StoreCredentials, bucket: &str, distribution_id: &str);
}
