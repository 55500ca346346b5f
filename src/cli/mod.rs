// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;

use clap::Parser;

use crate::analysis::ProcessingTimeMode;

/// Deepfake Detector Node
///
/// Every flag can also be set through the environment variable shown.
/// Unset flags fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "deepfake-detector-node")]
#[command(version)]
#[command(about = "HTTP service that flags deepfake images", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "DEEPFAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to (default 0.0.0.0:8000)
    #[arg(long, env = "LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Path to the YOLO detection model in ONNX format
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<String>,

    /// Labels file, one class name per line (overrides model metadata)
    #[arg(long, env = "LABELS_PATH")]
    pub labels_path: Option<String>,

    /// Minimum detection confidence in [0, 1]
    #[arg(long, env = "CONF_THRESHOLD")]
    pub conf_threshold: Option<f32>,

    /// NMS IoU threshold in [0, 1]
    #[arg(long, env = "IOU_THRESHOLD")]
    pub iou_threshold: Option<f32>,

    /// Analyses allowed in flight at once (0 = unbounded)
    #[arg(long, env = "MAX_CONCURRENT_INFERENCES")]
    pub max_concurrent_inferences: Option<usize>,

    /// How processingTime is reported
    #[arg(long, env = "PROCESSING_TIME", value_enum)]
    pub processing_time: Option<ProcessingTimeMode>,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "INTRA_THREADS")]
    pub intra_threads: Option<usize>,
}
