// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of YOLO detection output and non-maximum suppression

use std::cmp::Ordering;

use ndarray::{s, ArrayViewD, Axis, Ix2};

use crate::analysis::InferenceError;

/// A scored box in model input coordinates (corner format)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCandidate {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub class_id: usize,
    pub confidence: f32,
}

impl BoxCandidate {
    /// Build from centre format (cx, cy, w, h)
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32, class_id: usize, confidence: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            class_id,
            confidence,
        }
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &BoxCandidate) -> f32 {
        let inter_w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let inter_h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter = inter_w * inter_h;

        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// Decode a YOLO detection head output into candidates above `conf_threshold`
///
/// Accepts `[1, 4 + nc, N]` (Ultralytics export layout) or the transposed
/// `[1, N, 4 + nc]`. The axis of length `4 + num_classes` is the attribute
/// axis; when neither axis matches, the smaller one is used. Box coordinates
/// are `cx, cy, w, h` in input pixels and class scores are already activated.
/// A candidate is kept only when its best score is strictly above the
/// threshold.
pub fn decode_yolo_output(
    output: ArrayViewD<f32>,
    num_classes: usize,
    conf_threshold: f32,
) -> Result<Vec<BoxCandidate>, InferenceError> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(InferenceError::Output(format!(
            "expected output shape [1, A, N], got {:?}",
            shape
        )));
    }

    let rows = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .map_err(|e| InferenceError::Output(e.to_string()))?;

    let expected_attributes = num_classes + 4;
    let channel_first = if shape[1] == expected_attributes {
        true
    } else if shape[2] == expected_attributes {
        false
    } else {
        shape[1] <= shape[2]
    };

    // Orient as [attributes, candidates]
    let rows = if channel_first {
        rows
    } else {
        rows.reversed_axes()
    };

    let attributes = rows.shape()[0];
    if attributes <= 4 {
        return Err(InferenceError::Output(format!(
            "output has {} attributes per box, need at least 5",
            attributes
        )));
    }

    let mut candidates = Vec::new();
    for column in rows.axis_iter(Axis(1)) {
        let scores = column.slice(s![4..]);
        let (class_id, confidence) = scores.iter().enumerate().fold(
            (0, f32::NEG_INFINITY),
            |(best_id, best), (id, &score)| {
                if score > best {
                    (id, score)
                } else {
                    (best_id, best)
                }
            },
        );

        if confidence > conf_threshold {
            candidates.push(BoxCandidate::from_center(
                column[0], column[1], column[2], column[3], class_id, confidence,
            ));
        }
    }

    Ok(candidates)
}

/// Class-aware non-maximum suppression
///
/// Returns at most `max_detections` boxes in descending confidence order. A box
/// is dropped when it overlaps a kept box of the same class by more than
/// `iou_threshold`.
pub fn non_maximum_suppression(
    mut candidates: Vec<BoxCandidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<BoxCandidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<BoxCandidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }

        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
