// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload detection endpoint
//!
//! Provides POST /api/predict for running waste detection on an uploaded
//! image file.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::predict_handler;
pub use request::UploadRequest;
pub use response::PredictResponse;
