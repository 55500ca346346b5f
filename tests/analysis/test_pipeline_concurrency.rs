// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Admission control and blocking-pool behaviour of `AnalysisPipeline`

use deepfake_detector_node::analysis::{
    AnalysisError, AnalysisPipeline, ClassNames, Detector, InferenceError, ProcessingTimeMode,
    RawDetection,
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Detector that sleeps and records how many calls overlap
struct SlowDetector {
    names: ClassNames,
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowDetector {
    fn new(delay: Duration) -> Self {
        Self {
            names: ClassNames::from_labels(["fake", "real"]),
            delay,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Detector for SlowDetector {
    fn name(&self) -> &str {
        "slow"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Vec<RawDetection>, InferenceError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        std::thread::sleep(self.delay);

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![RawDetection {
            class_id: 0,
            confidence: 0.75,
        }])
    }

    fn class_names(&self) -> &ClassNames {
        &self.names
    }
}

/// Detector that panics inside the blocking task
struct PanickingDetector(ClassNames);

impl Detector for PanickingDetector {
    fn name(&self) -> &str {
        "panicking"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Vec<RawDetection>, InferenceError> {
        panic!("model crashed");
    }

    fn class_names(&self) -> &ClassNames {
        &self.0
    }
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(16, 16)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

async fn run_concurrently(pipeline: Arc<AnalysisPipeline>, requests: usize) {
    let image = png_bytes();
    let mut tasks = JoinSet::new();
    for _ in 0..requests {
        let pipeline = Arc::clone(&pipeline);
        let bytes = image.clone();
        tasks.spawn(async move { pipeline.analyze(bytes).await });
    }

    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap().unwrap();
        assert!(result.is_deepfake);
        assert_eq!(result.confidence_score, 75.0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_semaphore_caps_in_flight_analyses() {
    let detector = Arc::new(SlowDetector::new(Duration::from_millis(50)));
    let pipeline = Arc::new(AnalysisPipeline::new(
        detector.clone(),
        2,
        ProcessingTimeMode::Fixed,
    ));

    run_concurrently(Arc::clone(&pipeline), 8).await;

    assert_eq!(detector.calls.load(Ordering::SeqCst), 8);
    assert!(detector.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(pipeline.available_permits(), Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unbounded_pipeline_runs_all_requests() {
    let detector = Arc::new(SlowDetector::new(Duration::from_millis(20)));
    let pipeline = Arc::new(AnalysisPipeline::new(
        detector.clone(),
        0,
        ProcessingTimeMode::Fixed,
    ));

    run_concurrently(pipeline, 6).await;

    assert_eq!(detector.calls.load(Ordering::SeqCst), 6);
    assert!(detector.peak.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_measured_processing_time() {
    let detector = Arc::new(SlowDetector::new(Duration::from_millis(10)));
    let pipeline = AnalysisPipeline::new(detector, 1, ProcessingTimeMode::Measured);

    let result = pipeline.analyze(png_bytes()).await.unwrap();
    assert!(result.processing_time.ends_with(" seconds"));
    assert_ne!(result.processing_time, "0.5 seconds");
}

#[tokio::test]
async fn test_detector_panic_is_inference_error() {
    let detector = Arc::new(PanickingDetector(ClassNames::from_labels(["fake"])));
    let pipeline = AnalysisPipeline::new(detector, 1, ProcessingTimeMode::Fixed);

    let err = pipeline.analyze(png_bytes()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Inference(_)));

    // The permit is released even when the task panics
    assert_eq!(pipeline.available_permits(), Some(1));
}
