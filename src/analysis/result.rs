// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection and verdict types produced by the pipeline

/// Label that marks a detection as manipulated (compared case-insensitively)
pub const FAKE_LABEL: &str = "fake";

/// Round to two decimal places
///
/// Rounds the exact binary value of `value`, with exact ties going to the
/// even digit, so `80.125` becomes `80.12` and `3.125` becomes `3.12`.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// One labelled bounding box from the detector
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Label from the model's class table, verbatim
    pub label: String,
    /// Confidence as a percentage in [0, 100], two decimals
    pub confidence: f64,
}

impl Detection {
    /// Build a detection from a model score in [0, 1]
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        let score = f64::from(score).clamp(0.0, 1.0);
        Self {
            label: label.into(),
            confidence: round2(score * 100.0),
        }
    }

    pub fn is_fake(&self) -> bool {
        self.label.to_lowercase() == FAKE_LABEL
    }
}

/// Verdict for one analyzed image
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// True iff any detection is labelled "fake"
    pub is_deepfake: bool,
    /// Mean detection confidence (percent, two decimals), 0 when nothing was detected
    pub confidence_score: f64,
    /// Human-readable processing time, e.g. "0.5 seconds"
    pub processing_time: String,
    /// Detections in detector order
    pub anomalies: Vec<Detection>,
}

impl AnalysisResult {
    /// Aggregate detections into a verdict
    pub fn aggregate(anomalies: Vec<Detection>, processing_time: impl Into<String>) -> Self {
        let is_deepfake = anomalies.iter().any(Detection::is_fake);

        let confidence_score = if anomalies.is_empty() {
            0.0
        } else {
            let total: f64 = anomalies.iter().map(|d| d.confidence).sum();
            round2(total / anomalies.len() as f64)
        };

        Self {
            is_deepfake,
            confidence_score,
            processing_time: processing_time.into(),
            anomalies,
        }
    }
}
