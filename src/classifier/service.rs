// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classifier service: the entry point used by the presentation layer
//!
//! Construct one `Classifier` per process, share it behind an `Arc`, call
//! [`Classifier::initialize`] once at startup and [`Classifier::classify`]
//! per upload.

use std::path::PathBuf;

use super::model::ModelLoadError;
use super::model_manager::{ModelLoader, ModelManager, OnnxModelLoader};
use super::pipeline::{ClassifyError, PredictionPipeline, PredictionResult};
use super::preprocessing::ResizeFilter;

/// Configuration for the classifier artifact
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Path to the ONNX artifact
    pub model_path: PathBuf,
    /// Interpolation the artifact was trained with
    pub resize_filter: ResizeFilter,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/brain-tumor-classifier.onnx"),
            resize_filter: ResizeFilter::default(),
            intra_threads: 4,
        }
    }
}

#[derive(Debug)]
pub struct Classifier {
    manager: ModelManager,
    resize_filter: ResizeFilter,
}

impl Classifier {
    /// Classifier backed by the ONNX artifact described in `config`
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_loader(
            OnnxModelLoader {
                model_path: config.model_path,
                intra_threads: config.intra_threads,
            },
            config.resize_filter,
        )
    }

    /// Classifier backed by any model source
    pub fn with_loader(loader: impl ModelLoader + 'static, resize_filter: ResizeFilter) -> Self {
        Self {
            manager: ModelManager::new(loader),
            resize_filter,
        }
    }

    /// Load the artifact. Idempotent; safe to call concurrently.
    pub async fn initialize(&self) -> Result<(), ModelLoadError> {
        self.manager.initialize().await.map(|_| ())
    }

    pub fn is_ready(&self) -> bool {
        self.manager.is_loaded()
    }

    pub fn resize_filter(&self) -> ResizeFilter {
        self.resize_filter
    }

    pub fn model_source(&self) -> String {
        self.manager.source()
    }

    /// Pipeline over the loaded model, `None` before initialization
    pub fn pipeline(&self) -> Option<PredictionPipeline> {
        self.manager
            .get()
            .map(|model| PredictionPipeline::new(model, self.resize_filter))
    }

    /// Classify one uploaded scan
    pub fn classify(&self, raw_image_bytes: &[u8]) -> Result<PredictionResult, ClassifyError> {
        let pipeline = self.pipeline().ok_or(ClassifyError::NotInitialized)?;
        pipeline.classify(raw_image_bytes)
    }
}
