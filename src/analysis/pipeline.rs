// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analysis pipeline: decode → infer → label → aggregate
//!
//! `analyze_image` is the synchronous core. `AnalysisPipeline` wraps it for
//! the async server: work runs on the blocking pool and an optional semaphore
//! caps how many analyses are in flight at once.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::detector::Detector;
use super::error::{AnalysisError, InferenceError};
use super::result::{AnalysisResult, Detection};
use crate::vision::decode_image_bytes;

/// Value reported in `processingTime` when timing is not measured
pub const FIXED_PROCESSING_TIME: &str = "0.5 seconds";

/// How `processingTime` is filled in
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingTimeMode {
    /// Always report the fixed placeholder string
    #[default]
    Fixed,
    /// Report wall-clock time from decode start to result
    Measured,
}

impl ProcessingTimeMode {
    pub fn render(&self, started: Instant) -> String {
        match self {
            ProcessingTimeMode::Fixed => FIXED_PROCESSING_TIME.to_string(),
            ProcessingTimeMode::Measured => {
                format!("{:.2} seconds", started.elapsed().as_secs_f64())
            }
        }
    }
}

/// Analyze one image with the given detector
///
/// Fails with `AnalysisError::Decode` when the bytes are not an image the
/// `image` crate can read, and with `AnalysisError::Inference` when the model
/// fails or reports a class id that is not in its label table.
pub fn analyze_image(
    detector: &dyn Detector,
    image_bytes: &[u8],
    mode: ProcessingTimeMode,
) -> Result<AnalysisResult, AnalysisError> {
    let started = Instant::now();

    let (image, info) = decode_image_bytes(image_bytes)?;
    debug!(
        "Decoded image: {}x{}, {:?}, {} bytes",
        info.width, info.height, info.format, info.size_bytes
    );

    let raw = detector.detect(&image)?;

    let names = detector.class_names();
    let anomalies = raw
        .iter()
        .map(|d| {
            names
                .get(d.class_id)
                .map(|label| Detection::new(label, d.confidence))
                .ok_or(InferenceError::UnknownClass {
                    class_id: d.class_id,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisResult::aggregate(anomalies, mode.render(started)))
}

/// Shared pipeline handle used by request handlers
pub struct AnalysisPipeline {
    detector: Arc<dyn Detector>,
    permits: Option<Arc<Semaphore>>,
    max_concurrent_inferences: usize,
    processing_time: ProcessingTimeMode,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("detector", &self.detector.name())
            .field("max_concurrent_inferences", &self.max_concurrent_inferences)
            .field("processing_time", &self.processing_time)
            .finish_non_exhaustive()
    }
}

impl AnalysisPipeline {
    /// Create a pipeline around a loaded detector
    ///
    /// `max_concurrent_inferences == 0` disables admission control.
    pub fn new(
        detector: Arc<dyn Detector>,
        max_concurrent_inferences: usize,
        processing_time: ProcessingTimeMode,
    ) -> Self {
        let permits = (max_concurrent_inferences > 0)
            .then(|| Arc::new(Semaphore::new(max_concurrent_inferences)));

        Self {
            detector,
            permits,
            max_concurrent_inferences,
            processing_time,
        }
    }

    pub fn detector(&self) -> &Arc<dyn Detector> {
        &self.detector
    }

    pub fn processing_time(&self) -> ProcessingTimeMode {
        self.processing_time
    }

    /// Concurrency cap, `None` when unbounded
    pub fn max_concurrent_inferences(&self) -> Option<usize> {
        self.permits.as_ref().map(|_| self.max_concurrent_inferences)
    }

    /// Free slots right now, `None` when unbounded
    pub fn available_permits(&self) -> Option<usize> {
        self.permits.as_ref().map(|p| p.available_permits())
    }

    /// Stop admitting new work; queued and future calls fail as unavailable
    pub fn close(&self) {
        if let Some(permits) = &self.permits {
            permits.close();
        }
    }

    /// Analyze an uploaded image
    pub async fn analyze<B>(&self, image_bytes: B) -> Result<AnalysisResult, AnalysisError>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let _permit = match &self.permits {
            Some(permits) => Some(
                Arc::clone(permits)
                    .acquire_owned()
                    .await
                    .map_err(|_| AnalysisError::Unavailable("pipeline is closed".to_string()))?,
            ),
            None => None,
        };

        let detector = Arc::clone(&self.detector);
        let mode = self.processing_time;

        tokio::task::spawn_blocking(move || {
            analyze_image(detector.as_ref(), image_bytes.as_ref(), mode)
        })
        .await
        .map_err(|e| {
            warn!("Analysis task did not complete: {}", e);
            if e.is_panic() {
                AnalysisError::Inference(InferenceError::Session(
                    "detector panicked".to_string(),
                ))
            } else {
                AnalysisError::Unavailable("analysis task was cancelled".to_string())
            }
        })?
    }
}
