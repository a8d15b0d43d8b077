use crate::keys::StorageKey;
use crate::traits::{Ack, AssetStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use avatar_core::constants::CANONICAL_CONTENT_TYPE;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue};
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, ClientOptions, Error as ObjectStoreError, GetOptions, ObjectStore,
    PutOptions, PutPayload, RetryConfig,
};
use std::sync::Arc;

/// Settings for an S3 (or S3-compatible) bucket
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, ...)
    pub endpoint_url: Option<String>,
    /// Send `x-amz-acl: public-read` with every write
    pub public_read: bool,
}

/// Object-store backed asset storage.
///
/// Wraps any [`ObjectStore`]: the S3 client in production, [`InMemory`] in tests
/// and when `STORAGE_BACKEND=memory`.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    base_url: String,
    backend: StorageBackend,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Credentials come from the usual `AWS_*` environment variables. The client
    /// is built with retries disabled so a failed write surfaces after one attempt.
    pub fn new(settings: S3Settings) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(settings.region.clone())
            .with_bucket_name(settings.bucket.clone())
            .with_retry(RetryConfig {
                max_retries: 0,
                ..Default::default()
            });

        if settings.public_read {
            let mut headers = HeaderMap::new();
            headers.insert("x-amz-acl", HeaderValue::from_static("public-read"));
            builder =
                builder.with_client_options(ClientOptions::new().with_default_headers(headers));
        }

        if let Some(ref endpoint) = settings.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let base_url = match settings.endpoint_url {
            // Path-style for S3-compatible providers: {endpoint}/{bucket}
            Some(ref endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), settings.bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                settings.bucket, settings.region
            ),
        };

        Ok(S3Storage {
            store: Arc::new(store),
            bucket: settings.bucket,
            base_url,
            backend: StorageBackend::S3,
        })
    }

    /// Process-local store. Contents vanish with the process.
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        S3Storage {
            store: Arc::new(InMemory::new()),
            base_url: format!("memory://{}", bucket),
            bucket,
            backend: StorageBackend::Memory,
        }
    }

    fn generate_url(&self, key: &StorageKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

fn png_attributes() -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, CANONICAL_CONTENT_TYPE.into());
    attributes
}

#[async_trait]
impl AssetStore for S3Storage {
    async fn put(&self, key: &StorageKey, data: Bytes) -> StorageResult<Ack> {
        let size = data.len() as u64;
        let location = Path::from(key.as_str());
        let start = std::time::Instant::now();

        let opts = PutOptions::from(png_attributes());
        self.store
            .put_opts(&location, PutPayload::from(data), opts)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(Ack {
            key: key.clone(),
            url: self.generate_url(key),
            size_bytes: size,
        })
    }

    async fn get(&self, key: &StorageKey) -> StorageResult<Bytes> {
        let location = Path::from(key.as_str());
        let start = std::time::Instant::now();

        let result = self
            .store
            .get_opts(&location, GetOptions::default())
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
                other => StorageError::DownloadFailed(other.to_string()),
            })?;

        let data = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(data)
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
