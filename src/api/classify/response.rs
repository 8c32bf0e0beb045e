// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify response types

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassLabel, PredictionResult};

/// Shown with every prediction
pub const DISCLAIMER: &str =
    "This is an AI-assisted tool and should not replace professional medical advice.";

/// Advice text shown alongside a prediction
pub fn advisory_message(label: ClassLabel) -> String {
    if label.is_tumor() {
        format!(
            "A {} tumor has been detected. Please consult with a medical professional immediately for proper diagnosis and treatment.",
            label
        )
    } else {
        "No tumor detected in the MRI scan. However, please consult with a medical professional for a complete diagnosis.".to_string()
    }
}

/// Score for one class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassScore {
    pub label: ClassLabel,
    pub score: f32,
}

/// Response from classifying an MRI scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub request_id: String,
    /// Predicted class
    pub prediction: ClassLabel,
    /// Confidence in percent (unrounded)
    pub confidence: f32,
    /// Confidence rounded for display, e.g. "65.00%"
    pub confidence_display: String,
    pub is_tumor: bool,
    /// Per-class scores in model output order
    pub scores: Vec<ClassScore>,
    pub message: String,
    pub disclaimer: String,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Model artifact used
    pub model: String,
}

impl ClassifyResponse {
    pub fn new(
        request_id: String,
        result: &PredictionResult,
        processing_time_ms: u64,
        model: &str,
    ) -> Self {
        Self {
            request_id,
            prediction: result.predicted_label,
            confidence: result.confidence_percent,
            confidence_display: format!("{:.2}%", result.confidence_percent),
            is_tumor: result.is_tumor,
            scores: result
                .class_scores()
                .map(|(label, score)| ClassScore { label, score })
                .collect(),
            message: advisory_message(result.predicted_label),
            disclaimer: DISCLAIMER.to_string(),
            processing_time_ms,
            model: model.to_string(),
        }
    }
}
