//! Proof storage backends.
//!
//! The backend is selected once at process start: the presence of
//! `S3_BUCKET` picks the remote backend, otherwise proofs land on the
//! local filesystem. The chosen strategy is held as long-lived shared
//! state and never re-selected per request.

mod compress;
mod filesystem;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppResult;

pub use compress::compress_image;
pub use filesystem::FilesystemStorage;
pub use s3::S3Storage;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Storage backend trait.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store content under the given key
    async fn put(&self, key: &str, content: Bytes) -> AppResult<()>;

    /// Retrieve content by key
    async fn get(&self, key: &str) -> AppResult<Bytes>;

    /// Check if key exists
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Delete content by key
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Pick the process-wide backend from configuration.
pub fn select_backend(config: &Config) -> AppResult<Arc<dyn StorageBackend>> {
    match &config.s3_bucket {
        Some(bucket) => {
            tracing::info!(bucket = %bucket, "using S3 proof storage backend");
            Ok(Arc::new(S3Storage::new(
                bucket,
                &config.s3_region,
                config.s3_endpoint.as_deref(),
            )?))
        }
        None => {
            tracing::info!(path = %config.storage_path, "using filesystem proof storage backend");
            Ok(Arc::new(FilesystemStorage::new(&config.storage_path)))
        }
    }
}

/// Generate a fresh storage key for an uploaded proof, keeping the original
/// extension so MIME sniffing keeps working on the stored object.
pub fn proof_key(filename: &str) -> String {
    let id = Uuid::new_v4();
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= 8 => {
            format!("{}.{}", id, ext.to_ascii_lowercase())
        }
        _ => id.to_string(),
    }
}
