// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::classifier::{ClassLabel, CLASS_LABELS};
use crate::version::{get_version_info, VERSION_NUMBER};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "ok" once the model is loaded, "loading" before
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
    pub model: String,
    pub resize_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelInfo {
    pub index: usize,
    pub label: ClassLabel,
    pub is_tumor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsResponse {
    pub labels: Vec<LabelInfo>,
}

impl LabelsResponse {
    pub fn from_labels() -> Self {
        Self {
            labels: CLASS_LABELS
                .iter()
                .map(|label| LabelInfo {
                    index: label.index(),
                    label: *label,
                    is_tumor: label.is_tumor(),
                })
                .collect(),
        }
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.classifier.is_ready();

    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "loading" }.to_string(),
        version: VERSION_NUMBER.to_string(),
        model_loaded,
        model: state.classifier.model_source(),
        resize_filter: state.classifier.resize_filter().to_string(),
    })
}

/// GET /version
pub async fn version_handler() -> Json<serde_json::Value> {
    Json(get_version_info())
}

/// GET /v1/labels - class labels in model output order
pub async fn labels_handler() -> Json<LabelsResponse> {
    Json(LabelsResponse::from_labels())
}
