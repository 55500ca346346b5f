// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod version;
pub mod vision;

pub use analysis::{
    AnalysisError, AnalysisPipeline, AnalysisResult, ClassNames, Detection, Detector,
    InferenceError, ProcessingTimeMode, RawDetection,
};
pub use api::{create_router, ApiServer, AppState};
pub use config::NodeConfig;
pub use vision::{DetectionModelConfig, YoloDetectionModel};
