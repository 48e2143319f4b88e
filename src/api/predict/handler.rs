// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload detection handler

use axum::{extract::State, Json};
use axum_extra::extract::{multipart::MultipartRejection, Multipart};
use std::sync::Arc;
use tracing::{debug, info};

use super::request::UploadRequest;
use super::response::PredictResponse;
use crate::api::detection::{detect_and_store, log_failure};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::storage::Folder;

/// POST /api/predict - Detect waste objects in an uploaded image
///
/// # Request
/// multipart/form-data with a `file` part named `*.png`, `*.jpg` or `*.jpeg`
///
/// # Response
/// - `original_url`: where the stored upload can be fetched
/// - `processed_url`: where the annotated copy can be fetched
///
/// # Errors
/// - 400: no file, empty filename, or disallowed extension
/// - 500: model not loaded, or detection failed
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    predict(&state, multipart).await.map_err(|e| {
        log_failure("predict", &e);
        e
    })
}

async fn predict(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::ValidationError(format!("Malformed upload: {}", e)))?;

    let upload = UploadRequest::from_multipart(&mut multipart).await?;
    let (filename, extension) = upload.validate()?;
    debug!(
        "Upload received: {} as {} ({} bytes)",
        filename,
        extension,
        upload.data.len()
    );

    let original = state
        .store
        .save_upload(Folder::Uploads, &upload.data, filename)
        .await?;
    info!("File saved: {}", original.path.display());

    let result = detect_and_store(state, original).await?;
    Ok(Json(PredictResponse::from(&result)))
}
