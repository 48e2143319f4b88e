// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health probe
//!
//! Reports whether the model weights are present on disk. Never loads the
//! model.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::http_server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_path: String,
    pub model_found: bool,
    /// Whether the detector has been loaded into memory yet
    pub model_loaded: bool,
}

/// GET /api/health (and legacy GET /health)
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let path = state.detector.resolve_weights_path();

    match tokio::fs::try_exists(&path).await {
        Ok(found) => {
            let response = HealthResponse {
                status: "ok".to_string(),
                model_path: path.display().to_string(),
                model_found: found,
                model_loaded: state.detector.is_loaded(),
            };
            (StatusCode::OK, Json(json!(response)))
        }
        Err(e) => {
            tracing::error!("Health check failed for {}: {}", path.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "detail": e.to_string()})),
            )
        }
    }
}
