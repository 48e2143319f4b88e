// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Serving of stored original and annotated images

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::storage::{Folder, ImageExtension};

/// GET /api/uploads/:filename
pub async fn uploaded_file_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    serve_file(&state, Folder::Uploads, &filename).await
}

/// GET /api/processed/:filename
pub async fn processed_file_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    serve_file(&state, Folder::Processed, &filename).await
}

async fn serve_file(
    state: &AppState,
    folder: Folder,
    filename: &str,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.store.serve(folder, filename).await.map_err(|e| {
        debug!("Serving {}/{} failed: {}", folder, filename, e);
        ApiError::from(e)
    })?;

    Ok(([(header::CONTENT_TYPE, content_type_for(filename))], bytes))
}

pub fn content_type_for(filename: &str) -> &'static str {
    ImageExtension::from_filename(filename)
        .map(|ext| ext.content_type())
        .unwrap_or("application/octet-stream")
}
