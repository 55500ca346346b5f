// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Decoding of uploaded image bytes
//! - YOLO detection via ONNX Runtime
//!
//! Inference runs on the CPU execution provider only.

pub mod detection;
pub mod image_utils;

pub use detection::{DetectionModelConfig, YoloDetectionModel};
pub use image_utils::{decode_image_bytes, ImageError, ImageInfo};
