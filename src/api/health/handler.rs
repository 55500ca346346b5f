// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use chrono::Utc;

use super::response::{HealthResponse, ModelHealth};
use crate::api::server::AppState;
use crate::version::{get_version_info, VERSION_NUMBER};

/// GET /health - Liveness and loaded model summary
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let detector = state.pipeline.detector();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION_NUMBER.to_string(),
        build: get_version_info(),
        model: ModelHealth {
            name: detector.name().to_string(),
            classes: detector
                .class_names()
                .labels()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            input_size: detector.input_size(),
        },
        max_concurrent_inferences: state.pipeline.max_concurrent_inferences(),
        started_at: state.started_at,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}
