// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of raw YOLOv8 output tensors

use anyhow::Result;
use ndarray::ArrayViewD;

use super::preprocessing::Letterbox;
use super::Detection;

/// Turn a YOLOv8 head output into detections in original image space.
///
/// The expected layout is `[1, 4 + num_classes, num_anchors]`, where the
/// first four rows are `cx, cy, w, h` in model input pixels and the rest are
/// per-class scores. Exports that put anchors first (`[1, N, 4 + nc]`) are
/// accepted too.
pub fn decode_output(
    output: ArrayViewD<f32>,
    letterbox: &Letterbox,
    labels: &[String],
    confidence_threshold: f32,
) -> Result<Vec<Detection>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detection output shape: {:?}", shape);
    }

    // Attribute rows are always the short axis for real exports (84 vs 8400)
    let anchors_last = shape[1] <= shape[2];
    let (num_attrs, num_anchors) = if anchors_last {
        (shape[1], shape[2])
    } else {
        (shape[2], shape[1])
    };

    if num_attrs < 5 {
        anyhow::bail!("Detection output has no class scores: {:?}", shape);
    }
    let num_classes = num_attrs - 4;

    let at = |attr: usize, anchor: usize| -> f32 {
        if anchors_last {
            output[[0, attr, anchor]]
        } else {
            output[[0, anchor, attr]]
        }
    };

    let mut detections = Vec::new();
    for anchor in 0..num_anchors {
        let (class_id, score) = (0..num_classes)
            .map(|c| (c, at(4 + c, anchor)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if score < confidence_threshold {
            continue;
        }

        let cx = at(0, anchor);
        let cy = at(1, anchor);
        let w = at(2, anchor);
        let h = at(3, anchor);

        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);

        detections.push(Detection {
            class_id,
            label: label_for(labels, class_id),
            confidence: score,
            x1,
            y1,
            x2,
            y2,
        });
    }

    Ok(detections)
}

/// Class-aware non-maximum suppression.
///
/// Boxes are kept in descending confidence order; a box is dropped when it
/// overlaps an already kept box of the same class by more than
/// `iou_threshold`. At most `max_detections` boxes are returned.
pub fn non_max_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Detection> = Vec::new();
    for candidate in detections {
        if keep.len() >= max_detections {
            break;
        }
        let suppressed = keep
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            keep.push(candidate);
        }
    }
    keep
}

pub fn label_for(labels: &[String], class_id: usize) -> String {
    labels
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}
