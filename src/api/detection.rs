// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Steps shared by the upload and webcam endpoints once the original image
//! is on disk: infer, then persist the annotated copy.

use tracing::{debug, error, info, warn};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::storage::{Folder, StoredImage};
use crate::vision::{encode_image, Detection};

/// Prefix of annotated image file names
pub const PROCESSED_PREFIX: &str = "processed_";

/// Outcome of one detection request
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub original: StoredImage,
    pub processed: StoredImage,
    pub detections: Vec<Detection>,
}

/// Run the detector on a stored original and store the annotated result as
/// `processed_<original id>`, encoded like the original.
pub async fn detect_and_store(
    state: &AppState,
    original: StoredImage,
) -> Result<DetectionResult, ApiError> {
    let output = state.detector.infer(&original.path).await?;

    let bytes = encode_image(&output.annotated, original.extension.image_format())?;
    let processed_id = format!("{}{}", PROCESSED_PREFIX, original.id);
    let processed = state
        .store
        .save_as(Folder::Processed, &processed_id, &bytes)
        .await?;

    for det in &output.detections {
        debug!(
            "Detected {} ({:.2}) at [{:.0}, {:.0}, {:.0}, {:.0}]",
            det.label, det.confidence, det.x1, det.y1, det.x2, det.y2
        );
    }
    info!(
        "Processed image saved: {} ({} detections)",
        processed.path.display(),
        output.detections.len()
    );

    Ok(DetectionResult {
        original,
        processed,
        detections: output.detections,
    })
}

/// Log a failed request before it is turned into a response
pub fn log_failure(endpoint: &str, err: &ApiError) {
    match err {
        ApiError::ValidationError(_) | ApiError::NotFound(_) => {
            warn!("{} rejected: {}", endpoint, err)
        }
        _ => error!("Error in {} endpoint: {}", endpoint, err),
    }
}
