#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::{S3Settings, S3Storage};
use crate::{AssetStore, StorageBackend, StorageError, StorageResult};
use avatar_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn AssetStore>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(S3Settings {
                bucket: config.s3_bucket().to_string(),
                region,
                endpoint_url: config.s3_endpoint().map(String::from),
                public_read: config.s3_public_read(),
            })?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-s3")]
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory avatar storage; uploads are lost on restart");
            Ok(Arc::new(S3Storage::in_memory(config.s3_bucket())))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 | StorageBackend::Memory => Err(StorageError::ConfigError(
            "Object storage backends not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
