// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the waste detection node

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Endpoints served by this build
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/api/health"),
    ("GET", "/health"),
    ("POST", "/api/predict"),
    ("POST", "/api/webcam"),
    ("GET", "/api/uploads/{filename}"),
    ("GET", "/api/processed/{filename}"),
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Waste Detect Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
