// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::analyze::analyze_handler;
use super::errors::ApiError;
use super::health::health_handler;
use crate::analysis::AnalysisPipeline;
use crate::config::ServerConfig;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    pub max_upload_bytes: usize,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: Arc<AnalysisPipeline>, max_upload_bytes: usize) -> Self {
        Self {
            pipeline,
            max_upload_bytes,
            started_at: Utc::now(),
        }
    }
}

/// Build the HTTP router
///
/// CORS mirrors the request origin and allows credentials, so any browser
/// front end can call the service.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze/", post(analyze_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .fallback(not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::very_permissive()),
        )
        .with_state(state)
}

async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// HTTP server bound to its listen address
pub struct ApiServer {
    addr: SocketAddr,
    listener: tokio::net::TcpListener,
    state: AppState,
}

impl ApiServer {
    /// Bind the listener; serving starts with `serve`
    pub async fn bind(config: &ServerConfig, pipeline: Arc<AnalysisPipeline>) -> Result<Self> {
        let addr = config.socket_addr()?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let actual_addr = listener.local_addr()?;

        Ok(Self {
            addr: actual_addr,
            listener,
            state: AppState::new(pipeline, config.max_upload_bytes),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `shutdown` resolves
    ///
    /// On shutdown the pipeline stops admitting work and in-flight requests
    /// are allowed to finish.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let pipeline = Arc::clone(&self.state.pipeline);
        let app = create_router(self.state);

        info!("API server listening on {}", self.addr);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown requested, draining in-flight requests");
                pipeline.close();
            })
            .await
            .context("HTTP server error")?;

        info!("API server stopped");
        Ok(())
    }
}
