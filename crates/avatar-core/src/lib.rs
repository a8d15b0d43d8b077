//! Avatar Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration
//! shared by every avatar ingestion component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, DirectoryConfig, LogFormat, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Credential, ImagePayload, Principal, UploadRequest};
pub use storage_types::StorageBackend;
