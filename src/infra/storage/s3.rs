//! S3 storage backend using rust-s3 crate.
//!
//! Supports AWS S3 and S3-compatible services (MinIO, etc.).
//! Credentials come from the default chain (env vars, profile, instance
//! role); a custom endpoint switches to path-style access for MinIO.

use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tokio::time::{timeout, Duration};

use super::StorageBackend;
use crate::config::PROOF_FETCH_TIMEOUT_SECONDS;
use crate::errors::{AppError, AppResult};

/// S3 storage backend
pub struct S3Storage {
    bucket: Box<Bucket>,
}

impl S3Storage {
    /// Create new S3 backend for the given bucket
    pub fn new(bucket_name: &str, region: &str, endpoint: Option<&str>) -> AppResult<Self> {
        let credentials = Credentials::default()
            .map_err(|e| AppError::storage(format!("Failed to load S3 credentials: {}", e)))?;

        let region = match endpoint {
            Some(endpoint) => Region::Custom {
                region: region.to_string(),
                endpoint: endpoint.to_string(),
            },
            None => region
                .parse()
                .map_err(|_| AppError::storage(format!("Invalid S3 region: {}", region)))?,
        };

        let use_path_style = endpoint.is_some();

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| AppError::storage(format!("Failed to create S3 bucket: {}", e)))?;

        // Path-style access for MinIO compatibility
        let bucket = if use_path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self { bucket })
    }

    fn fetch_timeout() -> Duration {
        Duration::from_secs(PROOF_FETCH_TIMEOUT_SECONDS)
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    async fn put(&self, key: &str, content: Bytes) -> AppResult<()> {
        let response = self
            .bucket
            .put_object(key, &content)
            .await
            .map_err(|e| AppError::storage(format!("Failed to put object '{}': {}", key, e)))?;

        if response.status_code() != 200 {
            return Err(AppError::storage(format!(
                "S3 put for '{}' returned status {}",
                key,
                response.status_code()
            )));
        }

        tracing::debug!(key = %key, size = content.len(), "S3 put object successful");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        // Bounded fetch so a wedged remote surfaces as "file unavailable"
        // instead of hanging the request
        let response = timeout(Self::fetch_timeout(), self.bucket.get_object(key))
            .await
            .map_err(|_| AppError::storage(format!("Timed out fetching object '{}'", key)))?
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("404") || err_str.contains("NoSuchKey") {
                    AppError::NotFound
                } else {
                    AppError::storage(format!("Failed to get object '{}': {}", key, e))
                }
            })?;

        tracing::debug!(key = %key, size = response.bytes().len(), "S3 get object successful");
        Ok(Bytes::from(response.to_vec()))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self.bucket.head_object(key).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let err_str = e.to_string();
                if err_str.contains("404")
                    || err_str.contains("NoSuchKey")
                    || err_str.contains("Not Found")
                {
                    Ok(false)
                } else {
                    Err(AppError::storage(format!(
                        "Failed to check existence of '{}': {}",
                        key, e
                    )))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::storage(format!("Failed to delete object '{}': {}", key, e)))?;
        Ok(())
    }
}
