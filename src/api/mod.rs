// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod errors;
pub mod health;
pub mod server;

pub use analyze::{AnalyzeResponse, AnomalyEntry};
pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use health::HealthResponse;
pub use server::{create_router, ApiServer, AppState};
