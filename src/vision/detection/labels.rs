// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class label tables and export metadata for detection models

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::analysis::ClassNames;

/// ONNX custom metadata key that Ultralytics exports use for class names
pub const NAMES_METADATA_KEY: &str = "names";

/// ONNX custom metadata key holding the export image size, e.g. `[640, 640]`
pub const IMGSZ_METADATA_KEY: &str = "imgsz";

/// Load labels from a text file, one label per line, line index = class id
///
/// Blank lines are skipped without consuming an id.
pub fn load_labels_file<P: AsRef<Path>>(path: P) -> Result<ClassNames> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels file {}", path.display()))?;

    let names = ClassNames::from_labels(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty()),
    );

    if names.is_empty() {
        anyhow::bail!("Labels file {} contains no labels", path.display());
    }

    Ok(names)
}

/// Parse the `names` metadata entry, e.g. `{0: 'fake', 1: 'real'}`
///
/// Returns `None` when no `id: 'label'` pairs are found.
pub fn parse_names_metadata(raw: &str) -> Option<ClassNames> {
    let pattern = Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#).ok()?;

    let pairs: Vec<(usize, String)> = pattern
        .captures_iter(raw)
        .filter_map(|caps| {
            let id = caps.get(1)?.as_str().parse().ok()?;
            let label = caps.get(2).or_else(|| caps.get(3))?.as_str().to_string();
            Some((id, label))
        })
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(ClassNames::from_pairs(pairs))
    }
}

/// Parse the `imgsz` metadata entry into a square input size
///
/// Accepts `[640, 640]` or a bare `640`. Returns `None` for non-square or
/// unparseable sizes.
pub fn parse_imgsz_metadata(raw: &str) -> Option<u32> {
    let pattern = Regex::new(r"\d+").ok()?;
    let sizes: Vec<u32> = pattern
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    match sizes.as_slice() {
        [size] if *size > 0 => Some(*size),
        [height, width] if height == width && *height > 0 => Some(*height),
        _ => None,
    }
}
