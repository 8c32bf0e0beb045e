// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify endpoint handlers

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::ClassifyRequest;
use super::response::ClassifyResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::classifier::{decode_base64_image, ClassifyError, PredictionPipeline, PredictionResult};

/// Multipart field names accepted for the scan
const UPLOAD_FIELDS: &[&str] = &["image", "file"];

/// POST /v1/classify - Classify a base64-encoded MRI scan
///
/// # Request
/// - `image`: Base64-encoded JPEG or PNG (required)
/// - `format`: Format hint (png, jpg, jpeg) - defaults to "png"; the
///   decoded format wins, a mismatch is logged
///
/// # Errors
/// - 400 Bad Request: missing or undecodable image
/// - 503 Service Unavailable: model not loaded
/// - 500 Internal Server Error: inference failed
pub async fn classify_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    debug!("[{}] classify request received", request_id);

    if let Err(e) = request.validate() {
        warn!("[{}] classify validation failed: {}", request_id, e);
        return Err(e.with_request_id(request_id));
    }

    let id = request_id.clone();
    run_classification(&state, request_id, move |pipeline| {
        let (image, info) = decode_base64_image(request.image.as_deref().unwrap_or_default())?;
        if !request.hint_matches(info.format) {
            warn!(
                "[{}] format hint '{}' does not match detected {:?}",
                id, request.format, info.format
            );
        }
        pipeline.classify_image(&image)
    })
    .await
}

/// POST /v1/classify/upload - Classify an MRI scan uploaded as multipart form data
///
/// The scan is read from the first `image` (or `file`) field.
pub async fn classify_upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ClassifyResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    debug!("[{}] classify upload received", request_id);

    let mut upload = None;
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            warn!("[{}] malformed multipart body: {}", request_id, e);
            ApiError::InvalidRequest(format!("malformed multipart body: {}", e))
                .with_request_id(request_id.clone())
        })?;

        let Some(field) = field else { break };
        if !field.name().is_some_and(|name| UPLOAD_FIELDS.contains(&name)) {
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| {
            ApiError::InvalidRequest(format!("failed to read upload: {}", e))
                .with_request_id(request_id.clone())
        })?;
        upload = Some(bytes);
        break;
    }

    let bytes = upload.ok_or_else(|| {
        ApiError::ValidationError {
            field: "image".to_string(),
            message: "multipart field 'image' is required".to_string(),
        }
        .with_request_id(request_id.clone())
    })?;

    run_classification(&state, request_id, move |pipeline| pipeline.classify(&bytes)).await
}

/// Run a classification on the blocking pool and build the response
async fn run_classification<F>(
    state: &AppState,
    request_id: String,
    classify: F,
) -> Result<Json<ClassifyResponse>, ApiErrorResponse>
where
    F: FnOnce(&PredictionPipeline) -> Result<PredictionResult, ClassifyError> + Send + 'static,
{
    let pipeline = state.classifier.pipeline().ok_or_else(|| {
        warn!("[{}] classifier model not loaded", request_id);
        ApiError::ServiceUnavailable("Classifier model not loaded".to_string())
            .with_request_id(request_id.clone())
    })?;

    let model = state.classifier.model_source();
    let start = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || classify(&pipeline))
        .await
        .map_err(|e| {
            ApiError::InternalError(format!("classification task failed: {}", e))
                .with_request_id(request_id.clone())
        })?;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(result) => {
            info!(
                "[{}] classified as {} ({:.2}%), {}ms",
                request_id, result.predicted_label, result.confidence_percent, processing_time_ms
            );
            Ok(Json(ClassifyResponse::new(
                request_id,
                &result,
                processing_time_ms,
                &model,
            )))
        }
        Err(e) => {
            if e.is_client_error() {
                warn!("[{}] rejected upload: {}", request_id, e);
            } else {
                tracing::error!("[{}] classification failed: {}", request_id, e);
            }
            Err(ApiError::from(e).with_request_id(request_id))
        }
    }
}
