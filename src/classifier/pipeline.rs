// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction pipeline: bytes in, vetted prediction out
//!
//! decode → RGB → resize → scale → batch → validate → infer → interpret

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::image_utils::{decode_image_bytes, ImageError};
use super::labels::{ClassLabel, CLASS_LABELS, NUM_CLASSES};
use super::model::{InferenceError, ModelProvider};
use super::preprocessing::{preprocess, ResizeFilter};

/// Per-request classification failure
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The uploaded bytes are not a usable JPEG/PNG
    #[error(transparent)]
    Decode(#[from] ImageError),

    /// Preprocessing or the model broke its contract
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Classifier model is not initialized")]
    NotInitialized,
}

impl ClassifyError {
    /// True when the caller should fix the upload rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClassifyError::Decode(_))
    }
}

/// Outcome of classifying one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Raw per-class scores in label order
    pub scores: [f32; NUM_CLASSES],
    /// Label at the highest score (lowest index on ties)
    pub predicted_label: ClassLabel,
    /// Highest score times 100, unrounded
    pub confidence_percent: f32,
    pub is_tumor: bool,
}

impl PredictionResult {
    /// Derive the prediction from a raw score vector.
    ///
    /// Scores must be exactly [`NUM_CLASSES`] finite values in [0, 1].
    pub fn from_scores(scores: &[f32]) -> Result<Self, InferenceError> {
        let scores: [f32; NUM_CLASSES] =
            scores
                .try_into()
                .map_err(|_| InferenceError::OutputMismatch {
                    expected: NUM_CLASSES,
                    actual: scores.len(),
                })?;

        if let Some((index, value)) = scores
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || !(0.0..=1.0).contains(*v))
        {
            return Err(InferenceError::InvalidScore {
                index,
                value: *value,
            });
        }

        let best = argmax(&scores);
        let predicted_label = CLASS_LABELS[best];

        Ok(Self {
            scores,
            predicted_label,
            confidence_percent: scores[best] * 100.0,
            is_tumor: predicted_label.is_tumor(),
        })
    }

    /// Scores paired with their labels, in label order
    pub fn class_scores(&self) -> impl Iterator<Item = (ClassLabel, f32)> + '_ {
        CLASS_LABELS.iter().copied().zip(self.scores.iter().copied())
    }
}

/// Index of the maximum value; the first occurrence wins on ties.
///
/// Returns 0 for an empty slice.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Runs the full preprocessing + inference + interpretation chain
#[derive(Clone)]
pub struct PredictionPipeline {
    model: Arc<dyn ModelProvider>,
    resize_filter: ResizeFilter,
}

impl std::fmt::Debug for PredictionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionPipeline")
            .field("resize_filter", &self.resize_filter)
            .finish_non_exhaustive()
    }
}

impl PredictionPipeline {
    pub fn new(model: Arc<dyn ModelProvider>, resize_filter: ResizeFilter) -> Self {
        Self {
            model,
            resize_filter,
        }
    }

    pub fn resize_filter(&self) -> ResizeFilter {
        self.resize_filter
    }

    /// Classify raw JPEG/PNG bytes
    pub fn classify(&self, raw_bytes: &[u8]) -> Result<PredictionResult, ClassifyError> {
        let (image, info) = decode_image_bytes(raw_bytes)?;
        debug!(
            "Decoded {:?} scan: {}x{}, {} bytes",
            info.format, info.width, info.height, info.size_bytes
        );
        self.classify_image(&image)
    }

    /// Classify an already decoded image
    pub fn classify_image(&self, image: &DynamicImage) -> Result<PredictionResult, ClassifyError> {
        // preprocess validates shape and range before we touch the model
        let tensor = preprocess(image, self.resize_filter)?;

        let scores = self.model.predict(tensor.as_array())?;
        let result = PredictionResult::from_scores(&scores)?;

        debug!(
            "Predicted {} ({:.2}%), scores {:?}",
            result.predicted_label, result.confidence_percent, result.scores
        );

        Ok(result)
    }
}
