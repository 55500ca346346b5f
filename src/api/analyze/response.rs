// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze response types

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, Detection};

/// One detection in the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEntry {
    /// Class label reported by the model
    pub label: String,
    /// Confidence percentage (0-100, two decimals)
    pub confidence: f64,
}

impl From<Detection> for AnomalyEntry {
    fn from(detection: Detection) -> Self {
        Self {
            label: detection.label,
            confidence: detection.confidence,
        }
    }
}

/// Response from deepfake analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// True if any detection is labelled "fake"
    pub is_deepfake: bool,
    /// Mean detection confidence percentage, 0 with no detections
    pub confidence_score: f64,
    /// Processing time, e.g. "0.5 seconds"
    pub processing_time: String,
    /// Every detection, in model order
    pub anomalies: Vec<AnomalyEntry>,
}

impl From<AnalysisResult> for AnalyzeResponse {
    fn from(result: AnalysisResult) -> Self {
        Self {
            is_deepfake: result.is_deepfake,
            confidence_score: result.confidence_score,
            processing_time: result.processing_time,
            anomalies: result.anomalies.into_iter().map(AnomalyEntry::from).collect(),
        }
    }
}
