// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deepfake analysis pipeline
//!
//! Turns uploaded image bytes into a verdict:
//! - `detector` - contract for the detection model and its label table
//! - `pipeline` - decode, infer, label and aggregate
//! - `result` - detection and verdict types
//! - `error` - decode and inference failures

pub mod detector;
pub mod error;
pub mod pipeline;
pub mod result;

pub use detector::{ClassNames, Detector, RawDetection};
pub use error::{AnalysisError, InferenceError};
pub use pipeline::{analyze_image, AnalysisPipeline, ProcessingTimeMode, FIXED_PROCESSING_TIME};
pub use result::{round2, AnalysisResult, Detection, FAKE_LABEL};
