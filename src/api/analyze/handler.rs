// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::{missing_file, ImageUpload};
use super::response::AnalyzeResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::server::AppState;

/// POST /analyze/ - Check an image for deepfake content
///
/// Accepts a multipart form with the image in the `file` field and returns
/// the verdict with every detection the model produced.
///
/// # Response
/// - `isDeepfake`: true if any detection is labelled "fake"
/// - `confidenceScore`: mean detection confidence (percent)
/// - `processingTime`: e.g. "0.5 seconds"
/// - `anomalies`: `{ label, confidence }` per detection
///
/// # Errors
/// - 400 Bad Request: multipart body broken mid-stream or undecodable image
/// - 413 Payload Too Large: upload exceeds the configured limit
/// - 422 Unprocessable Entity: no `file` field, or not a multipart request
/// - 500 Internal Server Error: model inference failed
/// - 503 Service Unavailable: server is shutting down
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    debug!("Analyze request {} received", request_id);

    // Without a multipart content type there is no form, so no `file` field
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Analyze request {} is not multipart: {}", request_id, rejection);
        missing_file().with_request_id(&request_id)
    })?;

    let upload = ImageUpload::from_multipart(&mut multipart, state.max_upload_bytes)
        .await
        .map_err(|e| {
            warn!("Analyze request {} invalid upload: {}", request_id, e);
            e.with_request_id(&request_id)
        })?;

    debug!(
        "Request {}: file {:?} ({:?}), {} bytes",
        request_id,
        upload.file_name,
        upload.content_type,
        upload.bytes.len()
    );

    let result = state.pipeline.analyze(upload.bytes).await.map_err(|e| {
        warn!("Analyze request {} failed ({}): {}", request_id, e.kind(), e);
        ApiError::from(e).with_request_id(&request_id)
    })?;

    info!(
        "✅ Request {}: deepfake={}, score={:.2}, {} detections",
        request_id,
        result.is_deepfake,
        result.confidence_score,
        result.anomalies.len()
    );

    Ok(Json(AnalyzeResponse::from(result)))
}
