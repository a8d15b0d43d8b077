//! `POST /upload`

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use avatar_core::constants::UPLOAD_SUCCESS_MESSAGE;

use crate::error::HttpAppError;
use crate::extract::UploadForm;
use crate::state::AppState;

#[tracing::instrument(skip_all)]
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    form: UploadForm,
) -> Result<impl IntoResponse, HttpAppError> {
    let UploadForm(request) = form;
    let outcome = state
        .pipeline
        .handle(request)
        .await
        .map_err(|e| HttpAppError::from(e).expose_details(state.expose_error_details))?;

    tracing::info!(
        key = %outcome.key,
        url = %outcome.url,
        size_bytes = outcome.size_bytes,
        "Avatar stored"
    );

    Ok((StatusCode::OK, UPLOAD_SUCCESS_MESSAGE))
}
