use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::error::AppError;

/// Opaque secret presented by the uploader. Never printed.
#[derive(Clone, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Image payload as the transport delivered it.
///
/// Decoding is deferred to the pipeline's payload-acquisition stage so that a
/// malformed payload is only reported after the identity check.
#[derive(Clone)]
pub enum ImagePayload {
    /// Raw bytes, e.g. a multipart file part.
    Binary(Bytes),
    /// Standard base64 text, e.g. the `image` field of a JSON body.
    Base64(String),
}

impl ImagePayload {
    /// Produce the raw image bytes.
    pub fn into_bytes(self) -> Result<Bytes, AppError> {
        match self {
            ImagePayload::Binary(bytes) => Ok(bytes),
            ImagePayload::Base64(text) => {
                let trimmed = text.trim();
                STANDARD
                    .decode(trimmed)
                    .map(Bytes::from)
                    .map_err(|e| AppError::BadRequest(format!("Image decoding failed: {}", e)))
            }
        }
    }

    /// Size in bytes of the payload as received (before any decoding).
    pub fn transport_len(&self) -> usize {
        match self {
            ImagePayload::Binary(bytes) => bytes.len(),
            ImagePayload::Base64(text) => text.len(),
        }
    }
}

impl Default for ImagePayload {
    fn default() -> Self {
        ImagePayload::Binary(Bytes::new())
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImagePayload::Binary(bytes) => write!(f, "Binary({} bytes)", bytes.len()),
            ImagePayload::Base64(text) => write!(f, "Base64({} chars)", text.len()),
        }
    }
}

/// One upload, exclusively owned by a single pipeline invocation.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub principal_name: String,
    pub credential: Credential,
    pub raw_image: ImagePayload,
}

impl UploadRequest {
    pub fn new(
        principal_name: impl Into<String>,
        credential: impl Into<String>,
        raw_image: ImagePayload,
    ) -> Self {
        Self {
            principal_name: principal_name.into(),
            credential: Credential::new(credential),
            raw_image,
        }
    }
}
