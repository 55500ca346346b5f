// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector contract consumed by the analysis pipeline
//!
//! The pipeline only needs two things from a model: a list of scored class ids
//! for an image, and the id→label table the model was trained with.

use std::collections::BTreeMap;

use image::DynamicImage;

use super::error::InferenceError;

/// A single unlabelled detection as produced by the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    /// Class index into the model's label table
    pub class_id: usize,
    /// Model confidence in [0, 1]
    pub confidence: f32,
}

/// Fixed id→label table owned by a model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    names: BTreeMap<usize, String>,
}

impl ClassNames {
    /// Build a table from labels ordered by class id, starting at 0
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: labels
                .into_iter()
                .enumerate()
                .map(|(id, label)| (id, label.into()))
                .collect(),
        }
    }

    /// Build a table from explicit (id, label) pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(id, label)| (id, label.into()))
                .collect(),
        }
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of class score columns the table implies (highest id + 1)
    pub fn class_count(&self) -> usize {
        self.names.keys().next_back().map_or(0, |id| id + 1)
    }

    /// Labels in class-id order
    pub fn labels(&self) -> Vec<&str> {
        self.names.values().map(String::as_str).collect()
    }
}

/// Object detector used by the pipeline
///
/// Implementations are loaded once and shared read-only across requests, so
/// `detect` takes `&self` and must be callable from several threads.
pub trait Detector: Send + Sync {
    /// Human-readable model name for logs and the health endpoint
    fn name(&self) -> &str;

    /// Run the model on a whole decoded image
    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, InferenceError>;

    /// Label table supplied by the model at load time
    fn class_names(&self) -> &ClassNames;

    /// Square input size the model expects, if fixed
    fn input_size(&self) -> Option<u32> {
        None
    }
}
