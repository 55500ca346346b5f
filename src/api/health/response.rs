// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loaded model summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelHealth {
    pub name: String,
    pub classes: Vec<String>,
    pub input_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Build stamp and enabled features
    pub build: serde_json::Value,
    pub model: ModelHealth,
    /// `None` when concurrency is unbounded
    pub max_concurrent_inferences: Option<usize>,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}
