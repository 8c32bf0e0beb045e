// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod classifier;
pub mod cli;
pub mod version;

pub use classifier::{
    ClassLabel, Classifier, ClassifierConfig, ClassifyError, ImageError, InferenceError,
    ModelLoadError, ModelProvider, PredictionPipeline, PredictionResult, ResizeFilter,
};
