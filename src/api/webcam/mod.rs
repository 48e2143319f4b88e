// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Webcam detection endpoint
//!
//! Provides POST /api/webcam for running waste detection on a frame sent as
//! a base64 data URL.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::webcam_handler;
pub use request::WebcamRequest;
pub use response::WebcamResponse;
