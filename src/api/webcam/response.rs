// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

use crate::api::detection::DetectionResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebcamResponse {
    pub processed_image_url: String,
}

impl From<&DetectionResult> for WebcamResponse {
    fn from(result: &DetectionResult) -> Self {
        Self {
            processed_image_url: result.processed.url(),
        }
    }
}
