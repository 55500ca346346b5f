// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Values are resolved in layers: built-in defaults, then an optional TOML
//! file, then command-line flags and environment variables.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::ProcessingTimeMode;
use crate::cli::Cli;
use crate::vision::DetectionModelConfig;

/// Default upload limit for `/analyze/` (20 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.listen_addr))
    }
}

/// Analysis pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// In-flight analyses allowed at once; 0 disables the limit
    pub max_concurrent_inferences: usize,
    pub processing_time: ProcessingTimeMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrent_inferences: 4,
            processing_time: ProcessingTimeMode::Fixed,
        }
    }
}

/// Complete node configuration
///
/// ```toml
/// [server]
/// listen_addr = "0.0.0.0:8000"
///
/// [model]
/// model_path = "./models/best.onnx"
/// conf_threshold = 0.25
///
/// [analysis]
/// max_concurrent_inferences = 4
/// processing_time = "fixed"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub model: DetectionModelConfig,
    pub analysis: AnalysisConfig,
}

impl NodeConfig {
    /// Load configuration from a TOML file; missing sections keep defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Resolve the effective configuration for a command line
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply flags and environment values that were actually set
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(addr) = &cli.listen_addr {
            self.server.listen_addr = addr.clone();
        }
        if let Some(bytes) = cli.max_upload_bytes {
            self.server.max_upload_bytes = bytes;
        }
        if let Some(path) = &cli.model_path {
            self.model.model_path = path.clone();
        }
        if let Some(path) = &cli.labels_path {
            self.model.labels_path = Some(path.clone());
        }
        if let Some(conf) = cli.conf_threshold {
            self.model.conf_threshold = conf;
        }
        if let Some(iou) = cli.iou_threshold {
            self.model.iou_threshold = iou;
        }
        if let Some(threads) = cli.intra_threads {
            self.model.intra_threads = threads;
        }
        if let Some(max) = cli.max_concurrent_inferences {
            self.analysis.max_concurrent_inferences = max;
        }
        if let Some(mode) = cli.processing_time {
            self.analysis.processing_time = mode;
        }
    }

    /// Reject values that cannot produce a working server
    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr()?;

        if !(0.0..=1.0).contains(&self.model.conf_threshold) {
            anyhow::bail!(
                "conf_threshold must be within [0, 1], got {}",
                self.model.conf_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.model.iou_threshold) {
            anyhow::bail!(
                "iou_threshold must be within [0, 1], got {}",
                self.model.iou_threshold
            );
        }
        if self.model.input_size == 0 {
            anyhow::bail!("input_size must be positive");
        }
        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be positive");
        }

        Ok(())
    }
}
