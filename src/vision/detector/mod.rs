// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection behind a narrow trait seam
//!
//! The HTTP layer only needs `infer(image_path) -> (annotated image, boxes)`.
//! [`YoloDetector`] provides that with an ONNX export of a YOLOv8 model;
//! tests plug in their own [`Detector`] through a [`DetectorLoader`].

pub mod annotate;
pub mod postprocess;
pub mod preprocessing;
pub mod yolo;

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use annotate::draw_detections;
pub use yolo::{read_image, YoloDetector, YoloLoader, YoloParams};

/// Errors raised while loading or running a detector
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Model weights not found: {0}")]
    WeightsMissing(String),

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Failed to read image: {0}")]
    Decode(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// A single detected object, in original image pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: usize,
    pub label: String,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Detection {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// Output of one inference call
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    /// Input image with detections drawn on top
    pub annotated: DynamicImage,
    pub detections: Vec<Detection>,
}

/// A loaded model that can run inference on image files.
///
/// `infer` is blocking; callers on the async runtime should move it onto the
/// blocking pool.
pub trait Detector: Send + Sync {
    fn infer(&self, image_path: &Path) -> Result<DetectionOutput, DetectorError>;

    /// Short model name for logs
    fn name(&self) -> &str;
}

/// Builds a [`Detector`] from a weights file
pub trait DetectorLoader: Send + Sync {
    fn load(&self, weights_path: &Path) -> Result<Arc<dyn Detector>, DetectorError>;
}
