// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for waste detection
//!
//! This module provides:
//! - Image decoding helpers for uploads and webcam data URLs
//! - The detector trait and its YOLO/ONNX implementation
//! - The process-wide detector handle

pub mod detector;
pub mod image_utils;
pub mod model_manager;

pub use detector::{
    Detection, DetectionOutput, Detector, DetectorError, DetectorLoader, YoloDetector, YoloLoader,
    YoloParams,
};
pub use image_utils::{decode_data_url, decode_image_bytes, detect_format, encode_image, ImageError, ImageInfo};
pub use model_manager::{DetectorManager, DetectorModelConfig};
