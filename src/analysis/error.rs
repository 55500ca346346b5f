// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the analysis pipeline

use thiserror::Error;

use crate::vision::ImageError;

/// Failures raised by a detector while running the model
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Failed to build input tensor: {0}")]
    Tensor(String),

    #[error("Model run failed: {0}")]
    Session(String),

    #[error("Unexpected model output: {0}")]
    Output(String),

    #[error("Class id {class_id} is missing from the label table")]
    UnknownClass { class_id: usize },

    #[error("Detector session lock poisoned")]
    Lock,
}

/// Failures of a single `analyze` call
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] ImageError),

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Analysis unavailable: {0}")]
    Unavailable(String),
}

impl AnalysisError {
    /// Short machine-readable kind, used in logs and error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Decode(_) => "decode",
            AnalysisError::Inference(_) => "inference",
            AnalysisError::Unavailable(_) => "unavailable",
        }
    }
}
