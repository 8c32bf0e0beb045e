// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tumor classifier artifact (ONNX Runtime)
//!
//! The artifact contract:
//! - Input: float32 tensor [1, 128, 128, 3] (NHWC), values in [0, 1]
//! - Output: 4 per-class scores in [`CLASS_LABELS`](super::labels::CLASS_LABELS) order

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

use super::labels::NUM_CLASSES;
use super::preprocessing::{check_input_shape, INPUT_SHAPE};

/// Per-request failures inside or around the model call.
///
/// These indicate a preprocessing bug or an artifact that does not honour
/// its contract, never bad user input.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Invalid input shape: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Input value {value} at position {index} is outside [0, 1]")]
    ValueOutOfRange { index: usize, value: f32 },

    #[error("Model produced {actual} scores, expected {expected}")]
    OutputMismatch { expected: usize, actual: usize },

    #[error("Model produced invalid score {value} for class {index}")]
    InvalidScore { index: usize, value: f32 },

    #[error("Inference failed: {0}")]
    Runtime(String),
}

/// Artifact could not be loaded; no prediction can be served.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Classifier model not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to load classifier model: {0}")]
    Runtime(String),

    #[error("Classifier model is incompatible: {0}")]
    Incompatible(String),
}

/// Something that turns a preprocessed scan into per-class scores.
///
/// Implementations must be deterministic and safe to share across threads.
pub trait ModelProvider: Send + Sync {
    /// Run the classifier on a [1, 128, 128, 3] tensor
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

/// Tumor classifier backed by an ONNX Runtime session
///
/// Runs on CPU. `Session::run` needs exclusive access, so concurrent
/// requests are serialized on the session mutex.
#[derive(Clone)]
pub struct OnnxClassifierModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Path the artifact was loaded from
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxClassifierModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifierModel")
            .field("input_name", &self.input_name)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifierModel {
    /// Load the classifier from an ONNX file and validate its contract
    ///
    /// # Errors
    /// - [`ModelLoadError::NotFound`] if the file does not exist
    /// - [`ModelLoadError::Runtime`] if ONNX Runtime rejects the file
    /// - [`ModelLoadError::Incompatible`] if a probe inference on a zero
    ///   tensor does not yield exactly 4 scores
    pub fn load<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self, ModelLoadError> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(ModelLoadError::NotFound(model_path.to_path_buf()));
        }

        info!("Loading tumor classifier from {}", model_path.display());

        let session = build_session(model_path, intra_threads)
            .map_err(|e| ModelLoadError::Runtime(format!("{:#}", e)))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ModelLoadError::Incompatible("model declares no inputs".to_string()))?;

        if let Some(input) = session.inputs.first() {
            debug!("Classifier input {} type: {:?}", input_name, input.input_type);
        }

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            model_path: model_path.to_path_buf(),
        };

        // Probe with an all-black scan so a wrong artifact fails at startup
        let probe = model
            .run(&Array4::zeros(INPUT_SHAPE))
            .map_err(|e| ModelLoadError::Incompatible(e.to_string()))?;
        if probe.len() != NUM_CLASSES {
            return Err(ModelLoadError::Incompatible(format!(
                "expected {} output scores, got {}",
                NUM_CLASSES,
                probe.len()
            )));
        }

        info!("✅ Tumor classifier loaded successfully (CPU-only)");

        Ok(model)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn run(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let input_value = Value::from_array(input.to_owned())
            .map_err(|e| InferenceError::Runtime(format!("Failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Runtime("classifier session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| InferenceError::Runtime(format!("Classifier inference failed: {}", e)))?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("Failed to extract output tensor: {}", e)))?;

        debug!("Classifier output shape: {:?}", output_tensor.shape());

        Ok(output_tensor.iter().copied().collect())
    }
}

impl ModelProvider for OnnxClassifierModel {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        check_input_shape(input.shape())?;

        let scores = self.run(input)?;
        if scores.len() != NUM_CLASSES {
            return Err(InferenceError::OutputMismatch {
                expected: NUM_CLASSES,
                actual: scores.len(),
            });
        }

        Ok(scores)
    }
}

fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads.max(1))
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load classifier model from {}",
            model_path.display()
        ))?;

    Ok(session)
}
