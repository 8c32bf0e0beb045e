// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Classify endpoint tests
//!
//! Drive the router with `tower::ServiceExt::oneshot` against a stub model:
//! - Health, version and labels reflect the classifier state
//! - JSON and multipart uploads return the prediction with advisory text
//! - Bad uploads map to 400, an unloaded model to 503

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mri_tumor_classifier::api::classify::DISCLAIMER;
use mri_tumor_classifier::api::{create_router, AppState};
use mri_tumor_classifier::classifier::{
    Classifier, InferenceError, ModelLoadError, ModelLoader, ModelProvider, ResizeFilter,
};
use ndarray::Array4;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "----mri-test-boundary";

struct FixedModel(Vec<f32>);

impl ModelProvider for FixedModel {
    fn predict(&self, _input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        Ok(self.0.clone())
    }
}

struct StubLoader(Vec<f32>);

#[async_trait]
impl ModelLoader for StubLoader {
    async fn load(&self) -> Result<Arc<dyn ModelProvider>, ModelLoadError> {
        Ok(Arc::new(FixedModel(self.0.clone())))
    }

    fn describe(&self) -> String {
        "stub.onnx".to_string()
    }
}

/// Test helper: router over a classifier returning `scores`
async fn setup_router(scores: Vec<f32>) -> Router {
    let classifier = Classifier::with_loader(StubLoader(scores), ResizeFilter::Bicubic);
    classifier.initialize().await.unwrap();
    create_router(AppState::new(Arc::new(classifier)))
}

/// Test helper: router whose model was never loaded
fn setup_router_without_model() -> Router {
    let classifier = Classifier::with_loader(StubLoader(vec![0.25; 4]), ResizeFilter::Bicubic);
    create_router(AppState::new(Arc::new(classifier)))
}

fn png_scan() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(200, 150, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/v1/classify/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[cfg(test)]
mod classify_endpoint_tests {
    use super::*;

    // =============================================================================
    // Status endpoints
    // =============================================================================

    /// Test 1: Health reports a loaded model
    #[tokio::test]
    async fn test_health_when_loaded() {
        let app = setup_router(vec![0.25; 4]).await;
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["modelLoaded"], true);
        assert_eq!(body["model"], "stub.onnx");
        assert_eq!(body["resizeFilter"], "bicubic");
    }

    /// Test 2: Health reports loading before initialize
    #[tokio::test]
    async fn test_health_when_not_loaded() {
        let app = setup_router_without_model();
        let body = read_json(app.oneshot(get("/health")).await.unwrap()).await;
        assert_eq!(body["status"], "loading");
        assert_eq!(body["modelLoaded"], false);
    }

    /// Test 3: Labels are listed in model output order
    #[tokio::test]
    async fn test_labels_endpoint() {
        let app = setup_router(vec![0.25; 4]).await;
        let body = read_json(app.oneshot(get("/v1/labels")).await.unwrap()).await;

        let labels: Vec<&str> = body["labels"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["glioma", "meningioma", "no tumor", "pituitary"]);
    }

    /// Test 4: Version endpoint exposes the crate version
    #[tokio::test]
    async fn test_version_endpoint() {
        let app = setup_router(vec![0.25; 4]).await;
        let body = read_json(app.oneshot(get("/version")).await.unwrap()).await;
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    // =============================================================================
    // JSON classify
    // =============================================================================

    /// Test 5: No-tumor prediction with advisory text
    #[tokio::test]
    async fn test_classify_json_no_tumor() {
        let app = setup_router(vec![0.1, 0.2, 0.65, 0.05]).await;
        let request = json_request(
            "/v1/classify",
            json!({ "image": STANDARD.encode(png_scan()), "format": "png" }),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["prediction"], "no tumor");
        assert_eq!(body["isTumor"], false);
        assert_eq!(body["confidenceDisplay"], "65.00%");
        assert_eq!(body["scores"].as_array().unwrap().len(), 4);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("No tumor detected"));
        assert_eq!(body["disclaimer"], DISCLAIMER);
        assert_eq!(body["model"], "stub.onnx");
        assert!(body["requestId"].as_str().is_some());
    }

    /// Test 6: Tumor prediction names the tumor type
    #[tokio::test]
    async fn test_classify_json_tumor() {
        let app = setup_router(vec![0.05, 0.05, 0.1, 0.8]).await;
        let request = json_request("/v1/classify", json!({ "image": STANDARD.encode(png_scan()) }));

        let body = read_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(body["prediction"], "pituitary");
        assert_eq!(body["isTumor"], true);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("A pituitary tumor has been detected"));
    }

    /// Test 7: Detected format wins over a disagreeing hint
    #[tokio::test]
    async fn test_classify_json_hint_mismatch_still_classifies() {
        let app = setup_router(vec![0.1, 0.7, 0.1, 0.1]).await;
        let request = json_request(
            "/v1/classify",
            json!({ "image": STANDARD.encode(png_scan()), "format": "jpeg" }),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["prediction"], "meningioma");
    }

    /// Test 8: Invalid base64 is a 400 invalid_image
    #[tokio::test]
    async fn test_classify_json_bad_base64() {
        let app = setup_router(vec![0.25; 4]).await;
        let request = json_request("/v1/classify", json!({ "image": "!!!not-base64!!!" }));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error_type"], "invalid_image");
        assert!(body["request_id"].as_str().is_some());
    }

    /// Test 9: Bytes that are not an image are a 400
    #[tokio::test]
    async fn test_classify_json_not_an_image() {
        let app = setup_router(vec![0.25; 4]).await;
        let request = json_request(
            "/v1/classify",
            json!({ "image": STANDARD.encode(b"plain text, not a scan") }),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// Test 10: Missing image field is a validation error
    #[tokio::test]
    async fn test_classify_json_missing_image() {
        let app = setup_router(vec![0.25; 4]).await;
        let response = app
            .oneshot(json_request("/v1/classify", json!({ "format": "png" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error_type"], "validation_error");
        assert_eq!(body["details"]["field"], "image");
    }

    /// Test 11: Unloaded model is a 503
    #[tokio::test]
    async fn test_classify_without_model() {
        let app = setup_router_without_model();
        let request = json_request("/v1/classify", json!({ "image": STANDARD.encode(png_scan()) }));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = read_json(response).await;
        assert_eq!(body["error_type"], "service_unavailable");
    }

    /// Test 12: A model returning malformed scores is a 500
    #[tokio::test]
    async fn test_classify_bad_model_output() {
        let app = setup_router(vec![0.5, 0.5]).await;
        let request = json_request("/v1/classify", json!({ "image": STANDARD.encode(png_scan()) }));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert_eq!(body["error_type"], "internal_error");
    }

    // =============================================================================
    // Multipart upload
    // =============================================================================

    /// Test 13: Multipart upload classifies the `image` field
    #[tokio::test]
    async fn test_classify_upload() {
        let app = setup_router(vec![0.7, 0.1, 0.1, 0.1]).await;
        let response = app
            .oneshot(multipart_request("image", "scan.png", &png_scan()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["prediction"], "glioma");
        assert_eq!(body["isTumor"], true);
    }

    /// Test 14: Multipart upload without an image field is a 400
    #[tokio::test]
    async fn test_classify_upload_missing_field() {
        let app = setup_router(vec![0.25; 4]).await;
        let response = app
            .oneshot(multipart_request("notes", "notes.txt", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["details"]["field"], "image");
    }

    /// Test 15: Corrupt upload is a 400
    #[tokio::test]
    async fn test_classify_upload_corrupt_image() {
        let app = setup_router(vec![0.25; 4]).await;
        let scan = png_scan();
        let response = app
            .oneshot(multipart_request("image", "scan.png", &scan[..40]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error_type"], "invalid_image");
    }
}
