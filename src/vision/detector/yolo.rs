// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 detector backed by ONNX Runtime
//!
//! Expects an Ultralytics ONNX export (`yolo export format=onnx`) with a
//! single `[1, 3, S, S]` float input and the standard `[1, 4 + nc, N]` head.
//! Runs on CPU only.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::postprocess::{decode_output, non_max_suppression};
use super::preprocessing::preprocess;
use super::{draw_detections, DetectionOutput, Detector, DetectorError, DetectorLoader};

/// Tunables for YOLO inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoloParams {
    /// Square model input size in pixels
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    /// Intra-op threads for the ONNX session
    pub threads: usize,
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
            threads: 4,
        }
    }
}

/// YOLOv8 ONNX model
pub struct YoloDetector {
    /// Sessions need `&mut` to run, so inference is serialised
    session: Mutex<Session>,
    input_name: String,
    labels: Vec<String>,
    params: YoloParams,
    name: String,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .field("labels", &self.labels.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load a YOLO ONNX model from disk
    ///
    /// # Errors
    /// - weights file missing
    /// - ONNX Runtime initialisation or graph loading fails
    pub fn new<P: AsRef<Path>>(
        weights_path: P,
        labels: Vec<String>,
        params: YoloParams,
    ) -> Result<Self> {
        let weights_path = weights_path.as_ref();
        if !weights_path.exists() {
            anyhow::bail!("YOLO weights not found: {}", weights_path.display());
        }

        info!("Loading YOLO model from {}", weights_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(params.threads)
            .context("Failed to set intra threads")?
            .commit_from_file(weights_path)
            .with_context(|| {
                format!("Failed to load YOLO model from {}", weights_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let name = weights_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo".to_string());

        debug!("YOLO model input: {}, {} labels", input_name, labels.len());
        info!("✅ YOLO model '{}' loaded (CPU-only)", name);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            labels,
            params,
            name,
        })
    }

    pub fn params(&self) -> &YoloParams {
        &self.params
    }

    fn run(&self, image: &image::DynamicImage) -> Result<DetectionOutput> {
        let (tensor, letterbox) = preprocess(image, self.params.input_size);
        let input = Value::from_array(tensor).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("YOLO session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .context("YOLO inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let candidates = decode_output(
            output.view(),
            &letterbox,
            &self.labels,
            self.params.confidence_threshold,
        )?;
        let detections = non_max_suppression(
            candidates,
            self.params.iou_threshold,
            self.params.max_detections,
        );

        let annotated = draw_detections(image, &detections);
        Ok(DetectionOutput {
            annotated,
            detections,
        })
    }
}

impl Detector for YoloDetector {
    fn infer(&self, image_path: &Path) -> Result<DetectionOutput, DetectorError> {
        let start = Instant::now();

        let image = read_image(image_path)?;

        let output = self
            .run(&image)
            .map_err(|e| DetectorError::Inference(format!("{:#}", e)))?;

        info!(
            "YOLO inference on {}: {} detections in {}ms",
            image_path.display(),
            output.detections.len(),
            start.elapsed().as_millis()
        );

        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Decode an image file by its content, not its extension
pub fn read_image(path: &Path) -> Result<image::DynamicImage, DetectorError> {
    let decode_err = |e: &dyn std::fmt::Display| {
        DetectorError::Decode(format!("{}: {}", path.display(), e))
    };
    image::ImageReader::open(path)
        .map_err(|e| decode_err(&e))?
        .with_guessed_format()
        .map_err(|e| decode_err(&e))?
        .decode()
        .map_err(|e| decode_err(&e))
}

/// Loads [`YoloDetector`]s with a fixed label set and parameters
#[derive(Debug, Clone, Default)]
pub struct YoloLoader {
    pub params: YoloParams,
    /// Optional class-name file, one label per line
    pub labels_path: Option<PathBuf>,
}

impl YoloLoader {
    pub fn new(params: YoloParams, labels_path: Option<PathBuf>) -> Self {
        Self {
            params,
            labels_path,
        }
    }

    /// Read labels, falling back to numbered classes when no file is usable
    pub fn read_labels(&self) -> Vec<String> {
        let Some(path) = &self.labels_path else {
            return Vec::new();
        };
        match std::fs::read_to_string(path) {
            Ok(text) => parse_labels(&text),
            Err(e) => {
                warn!("⚠️ Could not read labels from {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

impl DetectorLoader for YoloLoader {
    fn load(&self, weights_path: &Path) -> Result<Arc<dyn Detector>, DetectorError> {
        if !weights_path.exists() {
            return Err(DetectorError::WeightsMissing(
                weights_path.display().to_string(),
            ));
        }
        let detector = YoloDetector::new(weights_path, self.read_labels(), self.params.clone())
            .map_err(|e| DetectorError::Load(format!("{:#}", e)))?;
        Ok(Arc::new(detector))
    }
}

/// One label per non-empty line, surrounding whitespace ignored
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
