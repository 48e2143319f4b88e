// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload request extraction and validation

use axum::body::Bytes;
use axum_extra::extract::Multipart;

use crate::api::errors::ApiError;
use crate::storage::ImageExtension;

/// Name of the multipart part carrying the image
pub const FILE_FIELD: &str = "file";

pub const NO_FILE_SELECTED: &str = "No file selected.";
pub const INVALID_FILE_TYPE: &str = "Invalid file type.";

/// The `file` part of an upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: Option<String>,
    pub data: Bytes,
}

impl UploadRequest {
    /// Pull the `file` part out of the form. Other parts are skipped.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ApiError> {
        loop {
            let field = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::ValidationError(format!("Malformed upload: {}", e)))?;

            let Some(field) = field else {
                return Err(ApiError::ValidationError(NO_FILE_SELECTED.to_string()));
            };

            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let filename = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::ValidationError(format!("Malformed upload: {}", e)))?;

            return Ok(Self { filename, data });
        }
    }

    /// Check the client filename; returns it with its parsed extension
    pub fn validate(&self) -> Result<(&str, ImageExtension), ApiError> {
        let filename = match self.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ApiError::ValidationError(NO_FILE_SELECTED.to_string())),
        };

        let extension = ImageExtension::from_filename(filename)
            .ok_or_else(|| ApiError::ValidationError(INVALID_FILE_TYPE.to_string()))?;
        Ok((filename, extension))
    }
}
