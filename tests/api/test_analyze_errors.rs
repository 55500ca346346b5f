// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Error handling tests for the analyze endpoint
//!
//! Every failure must map to a defined status with an `ErrorResponse` body
//! carrying a request id, and must never produce a 200.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use deepfake_detector_node::analysis::{
    AnalysisPipeline, ClassNames, InferenceError, ProcessingTimeMode, RawDetection,
};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use super::support::{
    app_for, app_with_pipeline, body_json, mock_detector, png_bytes, upload_request,
    MockDetector, BOUNDARY,
};

fn assert_request_id(body: &serde_json::Value) {
    let id = body["request_id"].as_str().expect("request_id missing");
    assert!(Uuid::parse_str(id).is_ok(), "request_id is not a UUID: {}", id);
}

#[tokio::test]
async fn test_malformed_image_bytes() {
    let mut detector = MockDetector::new();
    detector.expect_name().return_const("mock-yolo".to_string());
    detector
        .expect_class_names()
        .return_const(ClassNames::from_labels(["fake", "real"]));
    detector.expect_detect().times(0);

    let app = app_for(detector);
    let response = app
        .oneshot(upload_request("/analyze/", "file", b"definitely not an image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "invalid_image");
    assert_request_id(&body);
}

#[tokio::test]
async fn test_empty_file_field() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    let response = app
        .oneshot(upload_request("/analyze/", "file", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "invalid_image");
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    let response = app
        .oneshot(upload_request("/analyze/", "image", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["field"], "file");
    assert_request_id(&body);
}

#[tokio::test]
async fn test_non_multipart_request() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    let request = Request::builder()
        .method("POST")
        .uri("/analyze/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file": "abc"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["field"], "file");
}

#[tokio::test]
async fn test_empty_body_without_content_type() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    let request = Request::builder()
        .method("POST")
        .uri("/analyze/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "validation_error");
    assert_request_id(&body);
}

#[tokio::test]
async fn test_truncated_multipart_body() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    // Opening boundary and headers but no closing boundary
    let body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\r\nabc",
        BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/analyze/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    let request = Request::builder()
        .method("GET")
        .uri("/v1/nothing-here")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("/v1/nothing-here"));
}

#[tokio::test]
async fn test_detector_failure() {
    let mut detector = MockDetector::new();
    detector.expect_name().return_const("mock-yolo".to_string());
    detector
        .expect_class_names()
        .return_const(ClassNames::from_labels(["fake", "real"]));
    detector
        .expect_detect()
        .times(1)
        .returning(|_| Err(InferenceError::Session("onnx runtime exploded".to_string())));

    let app = app_for(detector);
    let response = app
        .oneshot(upload_request("/analyze/", "file", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "inference_failed");
    assert_request_id(&body);
}

#[tokio::test]
async fn test_unknown_class_id() {
    let app = app_for(mock_detector(
        &["fake", "real"],
        vec![RawDetection {
            class_id: 5,
            confidence: 0.9,
        }],
    ));

    let response = app
        .oneshot(upload_request("/analyze/", "file", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains('5'));
}

#[tokio::test]
async fn test_upload_too_large() {
    let pipeline = Arc::new(AnalysisPipeline::new(
        Arc::new(mock_detector(&["fake", "real"], vec![])),
        4,
        ProcessingTimeMode::Fixed,
    ));
    let app = app_with_pipeline(pipeline, 1024);

    let response = app
        .oneshot(upload_request("/analyze/", "file", &vec![0u8; 8 * 1024]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_closed_pipeline_unavailable() {
    let pipeline = Arc::new(AnalysisPipeline::new(
        Arc::new(mock_detector(&["fake", "real"], vec![])),
        4,
        ProcessingTimeMode::Fixed,
    ));
    pipeline.close();

    let app = app_with_pipeline(pipeline, 1024 * 1024);
    let response = app
        .oneshot(upload_request("/analyze/", "file", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "service_unavailable");
}

#[tokio::test]
async fn test_get_not_allowed() {
    let app = app_for(mock_detector(&["fake", "real"], vec![]));

    let request = Request::builder()
        .method("GET")
        .uri("/analyze/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
