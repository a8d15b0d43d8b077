//! Storage abstraction trait
//!
//! This module defines the `AssetStore` trait that all storage backends implement.

use crate::keys::StorageKey;
use crate::StorageBackend;
use async_trait::async_trait;
use avatar_core::AppError;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Every storage failure surfaces to the pipeline as `StorageUnavailable`;
/// the detail stays in the message for logs.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

/// Acknowledgement of a completed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub key: StorageKey,
    /// Publicly reachable URL of the object (subject to the bucket's visibility policy)
    pub url: String,
    pub size_bytes: u64,
}

/// Durable, key-addressed storage for canonical avatars.
///
/// **Write semantics:** `put` replaces the whole object at `key`. There is no
/// partial write, no append, and no versioning. Concurrent writers to the same
/// key are not serialized: the last write to complete wins. Callers must not
/// assume older uploads remain retrievable.
///
/// Every object is written with content type `image/png`. Visibility (for
/// example public-read) is fixed when the backend is constructed.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write `data` at `key`, replacing any previous object. One attempt, no retries.
    async fn put(&self, key: &StorageKey, data: Bytes) -> StorageResult<Ack>;

    /// Read back the current object at `key`.
    async fn get(&self, key: &StorageKey) -> StorageResult<Bytes>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
