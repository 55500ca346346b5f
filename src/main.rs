// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use deepfake_detector_node::{
    analysis::AnalysisPipeline,
    api::ApiServer,
    cli::Cli,
    config::NodeConfig,
    vision::YoloDetectionModel,
};
use std::{env, sync::Arc};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Deepfake Detector Node...\n");
    println!("📦 BUILD VERSION: {}", deepfake_detector_node::version::VERSION);
    println!("📅 Build Date: {}", deepfake_detector_node::version::BUILD_DATE);
    println!();

    info!("{}", deepfake_detector_node::version::get_version_string());

    let cli = Cli::parse();
    let config = NodeConfig::load(&cli)?;
    info!("Configuration: {:?}", config);

    println!("🧠 Loading detection model...");
    let model = YoloDetectionModel::load(&config.model).context("Failed to load detection model")?;
    println!("✅ Detection model loaded");

    let pipeline = Arc::new(AnalysisPipeline::new(
        Arc::new(model),
        config.analysis.max_concurrent_inferences,
        config.analysis.processing_time,
    ));

    if pipeline.max_concurrent_inferences().is_none() {
        warn!("Concurrent inference limit disabled");
    }

    let server = ApiServer::bind(&config.server, pipeline).await?;
    println!("✅ API server listening on http://{}", server.local_addr());
    println!("   POST /analyze/  (multipart field 'file')");
    println!("   GET  /health");
    println!("\nPress Ctrl+C to stop\n");

    server.serve(shutdown_signal()).await?;

    println!("👋 Deepfake Detector Node stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
