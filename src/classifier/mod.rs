// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Brain MRI tumor classification
//!
//! This module provides:
//! - Decoding of JPEG/PNG uploads
//! - Deterministic preprocessing to a [1, 128, 128, 3] tensor
//! - The ONNX classifier artifact, loaded once per process
//! - Interpretation of the four class scores
//!
//! Runs on CPU only.

pub mod image_utils;
pub mod labels;
pub mod model;
pub mod model_manager;
pub mod pipeline;
pub mod preprocessing;
pub mod service;

pub use image_utils::{decode_base64_image, decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use labels::{ClassLabel, CLASS_LABELS, NUM_CLASSES};
pub use model::{InferenceError, ModelLoadError, ModelProvider, OnnxClassifierModel};
pub use model_manager::{ModelLoader, ModelManager, OnnxModelLoader};
pub use pipeline::{argmax, ClassifyError, PredictionPipeline, PredictionResult};
pub use preprocessing::{preprocess, NormalizedTensor, ResizeFilter, INPUT_SHAPE, INPUT_SIZE};
pub use service::{Classifier, ClassifierConfig};
