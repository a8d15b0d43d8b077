//! Upload request extraction.
//!
//! `POST /upload` accepts two body shapes:
//!
//! * JSON `{"username", "password", "image"}` where `image` is standard base64.
//!   This is the default for any non-multipart content type, including none.
//! * `multipart/form-data` with text parts `username` and `password` and a
//!   binary part named `image` (or `file`).
//!
//! Absent fields become empty values; the pipeline decides whether that is an
//! error. Bodies that cannot be parsed at all are rejected here with 400, or
//! 413 when the body limit cut them off.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use avatar_core::{AppError, Credential, ImagePayload, UploadRequest};
use bytes::Bytes;
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonUpload {
    username: String,
    password: String,
    image: String,
}

/// Extractor producing an [`UploadRequest`] from either body shape
#[derive(Debug)]
pub struct UploadForm(pub UploadRequest);

/// Normalize MIME type by stripping parameters (e.g. "multipart/form-data; boundary=x" -> "multipart/form-data").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

fn body_error(status: StatusCode, detail: String) -> HttpAppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        HttpAppError::from(AppError::PayloadTooLarge(
            "Request body exceeds the upload size limit".to_string(),
        ))
    } else {
        HttpAppError::from(AppError::BadRequest(format!(
            "Invalid request body: {}",
            detail
        )))
    }
}

fn multipart_error(err: MultipartError) -> HttpAppError {
    body_error(err.status(), err.body_text())
}

impl FromRequest<Arc<AppState>> for UploadForm {
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        extract_upload(req, state)
            .await
            .map(UploadForm)
            .map_err(|e| e.expose_details(state.expose_error_details))
    }
}

async fn extract_upload<S>(req: Request, state: &S) -> Result<UploadRequest, HttpAppError>
where
    S: Send + Sync,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(normalize_mime_type)
        .unwrap_or_default();

    if content_type == "multipart/form-data" {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;
        return from_multipart(multipart).await;
    }

    let body = Bytes::from_request(req, state)
        .await
        .map_err(|e| body_error(e.status(), e.body_text()))?;
    let upload: JsonUpload = serde_json::from_slice(&body).map_err(AppError::from)?;

    Ok(UploadRequest {
        principal_name: upload.username,
        credential: Credential::new(upload.password),
        raw_image: ImagePayload::Base64(upload.image),
    })
}

async fn from_multipart(mut multipart: Multipart) -> Result<UploadRequest, HttpAppError> {
    let mut request = UploadRequest::default();
    let mut image_seen = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "username" => {
                request.principal_name = field.text().await.map_err(multipart_error)?;
            }
            "password" => {
                request.credential = Credential::new(field.text().await.map_err(multipart_error)?);
            }
            "image" | "file" => {
                if image_seen {
                    return Err(AppError::BadRequest(
                        "Multiple image fields are not allowed; send exactly one field named 'image'"
                            .to_string(),
                    )
                    .into());
                }
                image_seen = true;
                let data = field.bytes().await.map_err(multipart_error)?;
                request.raw_image = ImagePayload::Binary(data);
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_parameters_are_ignored() {
        assert_eq!(
            normalize_mime_type("Multipart/Form-Data; boundary=abc"),
            "multipart/form-data"
        );
        assert_eq!(normalize_mime_type("application/json"), "application/json");
    }

    #[test]
    fn json_fields_default_to_empty() {
        let upload: JsonUpload = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(upload.username, "alice");
        assert!(upload.password.is_empty());
        assert!(upload.image.is_empty());
    }
}
