// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detection on CPU
//!
//! - `preprocessing` - letterbox and tensor layout
//! - `postprocess` - output decoding and NMS
//! - `labels` - class label tables
//! - `model` - ONNX Runtime session wrapper

pub mod labels;
pub mod model;
pub mod postprocess;
pub mod preprocessing;

pub use labels::{load_labels_file, parse_imgsz_metadata, parse_names_metadata};
pub use model::{DetectionModelConfig, YoloDetectionModel};
pub use postprocess::{decode_yolo_output, non_maximum_suppression, BoxCandidate};
pub use preprocessing::{letterbox, preprocess_for_detection, Letterbox, DEFAULT_INPUT_SIZE};
