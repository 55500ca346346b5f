// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO detection model running on ONNX Runtime
//!
//! Loads an Ultralytics YOLO detection model exported to ONNX and exposes it
//! through the `Detector` trait used by the analysis pipeline.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::labels::{
    load_labels_file, parse_imgsz_metadata, parse_names_metadata, IMGSZ_METADATA_KEY,
    NAMES_METADATA_KEY,
};
use super::postprocess::{decode_yolo_output, non_maximum_suppression};
use super::preprocessing::{preprocess_for_detection, DEFAULT_INPUT_SIZE};
use crate::analysis::{ClassNames, Detector, InferenceError, RawDetection};

/// Settings for loading and running the detection model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionModelConfig {
    /// Path to the exported ONNX model
    pub model_path: String,
    /// Optional labels file; overrides the model's `names` metadata
    pub labels_path: Option<String>,
    /// Square input size, used when the model carries no `imgsz` metadata
    pub input_size: u32,
    /// Minimum class score for a candidate box
    pub conf_threshold: f32,
    /// IoU above which same-class boxes are suppressed
    pub iou_threshold: f32,
    /// Maximum detections kept per image
    pub max_detections: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for DetectionModelConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/best.onnx".to_string(),
            labels_path: None,
            input_size: DEFAULT_INPUT_SIZE,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

/// YOLO detector backed by an ONNX Runtime session
///
/// The session is created once and shared; ONNX Runtime needs exclusive
/// access for each run, so calls are serialised through a mutex.
pub struct YoloDetectionModel {
    session: Mutex<Session>,
    name: String,
    input_name: String,
    class_names: ClassNames,
    input_size: u32,
    conf_threshold: f32,
    iou_threshold: f32,
    max_detections: usize,
}

impl std::fmt::Debug for YoloDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetectionModel")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .field("class_names", &self.class_names)
            .field("input_size", &self.input_size)
            .field("conf_threshold", &self.conf_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .finish_non_exhaustive()
    }
}

impl YoloDetectionModel {
    /// Load the detection model described by `config`
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - No class names are available from the labels file or model metadata
    pub fn load(config: &DetectionModelConfig) -> Result<Self> {
        let model_path = Path::new(&config.model_path);

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads.max(1))
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("Detection model input {}: {:?}", input.name, input.input_type);
        }

        let class_names = match &config.labels_path {
            Some(path) => load_labels_file(path)?,
            None => {
                let raw = session
                    .metadata()
                    .ok()
                    .and_then(|metadata| metadata.custom(NAMES_METADATA_KEY).ok().flatten())
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "Model has no '{}' metadata; set a labels file",
                            NAMES_METADATA_KEY
                        )
                    })?;
                parse_names_metadata(&raw).ok_or_else(|| {
                    anyhow::anyhow!("Could not parse class names from metadata: {}", raw)
                })?
            }
        };

        let exported_size = session
            .metadata()
            .ok()
            .and_then(|metadata| metadata.custom(IMGSZ_METADATA_KEY).ok().flatten())
            .and_then(|raw| parse_imgsz_metadata(&raw));

        let input_size = match exported_size {
            Some(size) => {
                if size != config.input_size {
                    info!(
                        "Model was exported at {}px, overriding configured input size {}",
                        size, config.input_size
                    );
                }
                size
            }
            None => config.input_size,
        };

        let name = model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo".to_string());

        info!(
            "✅ Detection model '{}' loaded (CPU-only), classes: {:?}",
            name,
            class_names.labels()
        );

        Ok(Self {
            session: Mutex::new(session),
            name,
            input_name,
            class_names,
            input_size,
            conf_threshold: config.conf_threshold.clamp(0.0, 1.0),
            iou_threshold: config.iou_threshold.clamp(0.0, 1.0),
            max_detections: config.max_detections,
        })
    }
}

impl Detector for YoloDetectionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, InferenceError> {
        let (input, geometry) = preprocess_for_detection(image, self.input_size);

        let input_value =
            Value::from_array(input).map_err(|e| InferenceError::Tensor(e.to_string()))?;

        let mut session = self.session.lock().map_err(|_| InferenceError::Lock)?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| InferenceError::Session(e.to_string()))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::Output(e.to_string()))?;

        let candidates =
            decode_yolo_output(output, self.class_names.class_count(), self.conf_threshold)?;
        let kept = non_maximum_suppression(candidates, self.iou_threshold, self.max_detections);

        if kept.iter().any(|b| self.class_names.get(b.class_id).is_none()) {
            warn!(
                "Model produced class ids outside its label table ({} labels)",
                self.class_names.len()
            );
        }

        let (width, height) = image.dimensions();
        for b in &kept {
            let (x1, y1) = geometry.map_to_original(b.x1, b.y1);
            let (x2, y2) = geometry.map_to_original(b.x2, b.y2);
            debug!(
                "class {} conf {:.3} box [{:.0}, {:.0}, {:.0}, {:.0}] in {}x{}",
                b.class_id, b.confidence, x1, y1, x2, y2, width, height
            );
        }

        Ok(kept
            .into_iter()
            .map(|b| RawDetection {
                class_id: b.class_id,
                confidence: b.confidence,
            })
            .collect())
    }

    fn class_names(&self) -> &ClassNames {
        &self.class_names
    }

    fn input_size(&self) -> Option<u32> {
        Some(self.input_size)
    }
}
