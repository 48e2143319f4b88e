// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod storage;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, ApiError, AppState};
pub use config::{ServerArgs, ServerConfig};
pub use storage::{Folder, ImageExtension, ImageStore, StorageError, StoredImage};
pub use vision::{
    Detection, DetectionOutput, Detector, DetectorError, DetectorLoader, DetectorManager,
    DetectorModelConfig, YoloLoader, YoloParams,
};
