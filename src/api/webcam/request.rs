// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Webcam request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

pub const NO_IMAGE_DATA: &str = "No image data received";

/// Frame captured by the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebcamRequest {
    /// Data URL: `data:image/<fmt>;base64,<payload>`
    #[serde(default)]
    pub image: Option<String>,
}

impl WebcamRequest {
    /// Return the data URL, rejecting a missing or empty one
    pub fn validate(&self) -> Result<&str, ApiError> {
        match self.image.as_deref() {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(ApiError::ValidationError(NO_IMAGE_DATA.to_string())),
        }
    }
}
