// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Webcam detection handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use image::ImageFormat;
use std::sync::Arc;
use tracing::{debug, info};

use super::request::WebcamRequest;
use super::response::WebcamResponse;
use crate::api::detection::{detect_and_store, log_failure};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::storage::{Folder, ImageExtension};
use crate::vision::{decode_data_url, decode_image_bytes, encode_image};

/// Prefix of stored webcam frames
pub const WEBCAM_PREFIX: &str = "webcam_";

/// POST /api/webcam - Detect waste objects in a webcam frame
///
/// # Request
/// - `image`: data URL; everything after the first comma is base64
///
/// # Response
/// - `processed_image_url`: where the annotated frame can be fetched
///
/// # Errors
/// - 400: body is not JSON, or `image` is missing/empty
/// - 500: undecodable payload, model not loaded, or detection failed
pub async fn webcam_handler(
    State(state): State<Arc<AppState>>,
    request: Result<Json<WebcamRequest>, JsonRejection>,
) -> Result<Json<WebcamResponse>, ApiError> {
    webcam(&state, request).await.map_err(|e| {
        log_failure("webcam", &e);
        e
    })
}

async fn webcam(
    state: &AppState,
    request: Result<Json<WebcamRequest>, JsonRejection>,
) -> Result<Json<WebcamResponse>, ApiError> {
    let Json(request) =
        request.map_err(|_| ApiError::ValidationError(super::request::NO_IMAGE_DATA.to_string()))?;
    let data_url = request.validate()?;

    let raw = decode_data_url(data_url)?;
    let (frame, info) = decode_image_bytes(&raw)?;
    debug!(
        "Webcam frame decoded: {}x{} {:?}",
        info.width, info.height, info.format
    );

    // Frames are always stored as JPEG, whatever the browser sent
    let jpeg = encode_image(&frame, ImageFormat::Jpeg)?;
    let original = state
        .store
        .save(Folder::Uploads, &jpeg, WEBCAM_PREFIX, ImageExtension::Jpg)
        .await?;
    info!("Webcam frame saved: {}", original.path.display());

    let result = detect_and_store(state, original).await?;
    Ok(Json(WebcamResponse::from(&result)))
}
