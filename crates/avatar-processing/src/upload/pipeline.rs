//! Ingestion pipeline: validate → verify → acquire → normalize → store.
//!
//! Stages run strictly in order and the first failure ends the request with
//! its own error kind. Authentication precedes any look at the image, so a
//! caller with bad credentials learns nothing about how their payload would
//! have been handled. There is no rollback: nothing is written before the
//! final stage.

use std::sync::Arc;
use std::time::Instant;

use avatar_core::models::validate_principal_name;
use avatar_core::{AppError, UploadRequest};
use avatar_directory::IdentityVerifier;
use avatar_storage::{AssetStore, StorageKey};

use crate::codec::ImageCodec;
use crate::validator::PayloadValidator;

/// Result of a completed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub key: StorageKey,
    pub url: String,
    pub size_bytes: u64,
}

pub struct IngestionPipeline {
    verifier: Arc<dyn IdentityVerifier>,
    store: Arc<dyn AssetStore>,
    codec: ImageCodec,
    validator: PayloadValidator,
}

impl IngestionPipeline {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        store: Arc<dyn AssetStore>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            verifier,
            store,
            codec: ImageCodec::new(),
            validator: PayloadValidator::new(max_image_bytes),
        }
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    #[tracing::instrument(skip_all, fields(principal = %request.principal_name))]
    pub async fn handle(&self, request: UploadRequest) -> Result<UploadOutcome, AppError> {
        let started = Instant::now();
        let UploadRequest {
            principal_name,
            credential,
            raw_image,
        } = request;

        // 1. Required fields
        if principal_name.trim().is_empty() {
            return Err(AppError::BadRequest("username is required".to_string()));
        }
        if credential.is_empty() {
            return Err(AppError::BadRequest("password is required".to_string()));
        }
        validate_principal_name(&principal_name)?;

        // 2. Verify
        let stage = Instant::now();
        let principal = self.verifier.verify(&principal_name, &credential).await?;
        drop(credential);
        tracing::debug!(
            stage = "verify",
            duration_ms = stage.elapsed().as_secs_f64() * 1000.0,
            "Principal verified"
        );

        // 3. Acquire payload
        let transport_len = raw_image.transport_len();
        let bytes = raw_image.into_bytes()?;
        self.validator.validate_size(bytes.len())?;
        tracing::debug!(
            stage = "acquire",
            transport_bytes = transport_len,
            size_bytes = bytes.len(),
            "Payload acquired"
        );

        // 4. Normalize
        let stage = Instant::now();
        let codec = self.codec;
        let canonical = tokio::task::spawn_blocking(move || codec.normalize(bytes))
            .await
            .map_err(|e| AppError::Internal(format!("Image conversion task failed: {}", e)))??;
        tracing::debug!(
            stage = "normalize",
            size_bytes = canonical.len(),
            duration_ms = stage.elapsed().as_secs_f64() * 1000.0,
            "Image normalized to PNG"
        );

        // 5. Key
        let key = StorageKey::for_principal(&principal)?;

        // 6. Store
        let ack = self.store.put(&key, canonical.into_bytes()).await?;

        tracing::info!(
            key = %ack.key,
            size_bytes = ack.size_bytes,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Avatar uploaded"
        );

        // 7. Success
        Ok(UploadOutcome {
            key: ack.key,
            url: ack.url,
            size_bytes: ack.size_bytes,
        })
    }
}
