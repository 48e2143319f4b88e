// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload detection response

use serde::{Deserialize, Serialize};

use crate::api::detection::DetectionResult;

/// URLs of the stored original and its annotated copy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub original_url: String,
    pub processed_url: String,
}

impl From<&DetectionResult> for PredictResponse {
    fn from(result: &DetectionResult) -> Self {
        Self {
            original_url: result.original.url(),
            processed_url: result.processed.url(),
        }
    }
}
