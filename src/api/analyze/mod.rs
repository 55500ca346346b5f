// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze API endpoint module
//!
//! Provides POST /analyze/ for deepfake detection on uploaded images.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::analyze_handler;
pub use request::{ImageUpload, FILE_FIELD};
pub use response::{AnalyzeResponse, AnomalyEntry};
