// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide detector handle
//!
//! The detector is loaded on first use (or eagerly via [`DetectorManager::preload`])
//! and kept for the lifetime of the process. Concurrent first requests share a
//! single in-flight load. A failed load is not cached, so the next request
//! tries again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::vision::detector::{Detector, DetectorError, DetectorLoader};

/// Where to find model weights
#[derive(Debug, Clone)]
pub struct DetectorModelConfig {
    /// Preferred weights file
    pub weights_path: PathBuf,
    /// Used when `weights_path` does not exist
    pub fallback_weights: PathBuf,
}

impl Default for DetectorModelConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::from("yolov8n_waste_detection2/weights/model.onnx"),
            fallback_weights: PathBuf::from("yolov8n.onnx"),
        }
    }
}

impl DetectorModelConfig {
    /// The configured weights path if it exists, otherwise the fallback.
    ///
    /// The fallback is returned without checking it; loading may still fail.
    pub fn resolve(&self) -> PathBuf {
        if self.weights_path.exists() {
            self.weights_path.clone()
        } else {
            self.fallback_weights.clone()
        }
    }
}

/// Owner of the lazily loaded detector
pub struct DetectorManager {
    config: DetectorModelConfig,
    loader: Arc<dyn DetectorLoader>,
    detector: OnceCell<Arc<dyn Detector>>,
}

impl std::fmt::Debug for DetectorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorManager")
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl DetectorManager {
    pub fn new(config: DetectorModelConfig, loader: Arc<dyn DetectorLoader>) -> Self {
        Self {
            config,
            loader,
            detector: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DetectorModelConfig {
        &self.config
    }

    /// Weights path that a load would use right now
    pub fn resolve_weights_path(&self) -> PathBuf {
        self.config.resolve()
    }

    pub fn is_loaded(&self) -> bool {
        self.detector.initialized()
    }

    /// Return the detector, loading it if this is the first call.
    ///
    /// Loading runs on the blocking pool.
    pub async fn get_or_load(&self) -> Result<Arc<dyn Detector>, DetectorError> {
        let detector = self
            .detector
            .get_or_try_init(|| async {
                let weights = self.resolve_weights_path();
                let loader = Arc::clone(&self.loader);
                tracing::info!("Loading detector from {}", weights.display());

                let result = tokio::task::spawn_blocking(move || loader.load(&weights))
                    .await
                    .map_err(|e| DetectorError::Load(format!("loader task failed: {}", e)))?;

                match &result {
                    Ok(detector) => tracing::info!("✅ Detector '{}' ready", detector.name()),
                    Err(e) => tracing::warn!("⚠️ Detector load failed: {}", e),
                }
                result
            })
            .await?;

        Ok(Arc::clone(detector))
    }

    /// Load at startup instead of on the first request
    pub async fn preload(&self) -> Result<(), DetectorError> {
        self.get_or_load().await.map(|_| ())
    }

    /// Run inference on a stored image file, off the async runtime
    pub async fn infer(
        &self,
        image_path: &Path,
    ) -> Result<crate::vision::detector::DetectionOutput, DetectorError> {
        let detector = self.get_or_load().await?;
        let path = image_path.to_path_buf();

        tokio::task::spawn_blocking(move || detector.infer(&path))
            .await
            .map_err(|e| DetectorError::Inference(format!("inference task failed: {}", e)))?
    }
}
