// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use deepfake_detector_node::analysis::{AnalysisPipeline, ProcessingTimeMode};
use deepfake_detector_node::version::VERSION_NUMBER;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use super::support::{app_for, app_with_pipeline, body_json, mock_detector};

fn health_request() -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_model() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    let response = app.oneshot(health_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], VERSION_NUMBER);
    assert_eq!(body["build"]["version"], VERSION_NUMBER);
    assert!(body["build"]["features"]
        .as_array()
        .unwrap()
        .contains(&json!("yolo-onnx-detection")));
    assert_eq!(
        body["model"],
        json!({ "name": "mock-yolo", "classes": ["fake", "real"], "inputSize": 640 })
    );
    assert_eq!(body["maxConcurrentInferences"], 4);
    assert!(body["startedAt"].is_string());
    assert!(body["uptimeSeconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_health_unbounded_concurrency() {
    let pipeline = Arc::new(AnalysisPipeline::new(
        Arc::new(mock_detector(&["fake", "real"], vec![])),
        0,
        ProcessingTimeMode::Fixed,
    ));

    let response = app_with_pipeline(pipeline, 1024)
        .oneshot(health_request())
        .await
        .unwrap();
    let body = body_json(response).await;

    assert!(body["maxConcurrentInferences"].is_null());
}
