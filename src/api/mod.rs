// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detection;
pub mod errors;
pub mod files;
pub mod health;
pub mod http_server;
pub mod predict;
pub mod webcam;

pub use detection::{detect_and_store, DetectionResult, PROCESSED_PREFIX};
pub use errors::{ApiError, ErrorResponse};
pub use health::{health_handler, HealthResponse};
pub use http_server::{create_app, start_server, AppState};
pub use predict::{predict_handler, PredictResponse, UploadRequest};
pub use webcam::{webcam_handler, WebcamRequest, WebcamResponse};
