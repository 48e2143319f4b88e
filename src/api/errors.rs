// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::StorageError;
use crate::vision::{DetectorError, ImageError};

/// JSON error body: `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Missing or malformed client input
    ValidationError(String),
    NotFound(String),
    /// Detector could not be loaded; the reason is logged, not returned
    ModelUnavailable(String),
    /// Payload could not be turned into an image
    DecodeError(String),
    InternalError(String),
}

impl ApiError {
    /// Message returned to the client
    pub fn message(&self) -> String {
        match self {
            ApiError::ValidationError(msg) => msg.clone(),
            ApiError::NotFound(_) => "File not found".to_string(),
            ApiError::ModelUnavailable(_) => "Model not loaded".to_string(),
            ApiError::DecodeError(msg) | ApiError::InternalError(msg) => {
                format!("Detection failed: {}", msg)
            }
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::ModelUnavailable(_)
            | ApiError::DecodeError(_)
            | ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            ApiError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => ApiError::NotFound(name),
            StorageError::UnsupportedExtension(_) => {
                ApiError::ValidationError("Invalid file type.".to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<DetectorError> for ApiError {
    fn from(err: DetectorError) -> Self {
        match err {
            DetectorError::WeightsMissing(_) | DetectorError::Load(_) => {
                ApiError::ModelUnavailable(err.to_string())
            }
            DetectorError::Decode(_) => ApiError::DecodeError(err.to_string()),
            DetectorError::Inference(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        ApiError::DecodeError(err.to_string())
    }
}
