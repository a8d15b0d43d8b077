//! Avatar Storage Library
//!
//! This crate provides the `AssetStore` abstraction and its implementations
//! for S3-compatible object stores and the local filesystem.
//!
//! # Storage key format
//!
//! Every principal owns exactly one key: `{normalized principal name}/avatar.png`.
//! Writes to a key replace the whole object. There is no versioning and no
//! conflict detection: when two uploads for the same principal race, the one
//! whose write completes last is the one that remains visible.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use avatar_core::StorageBackend;
pub use factory::create_storage;
pub use keys::StorageKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Settings, S3Storage};
pub use traits::{Ack, AssetStore, StorageError, StorageResult};
