// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX classifier artifact tests
//!
//! Shape and output-count checks run against the committed fixtures in
//! `test_onnx_fixture.rs`. Tests marked `#[ignore]` need the real artifact; point `MODEL_PATH` at it
//! and run with `cargo test -- --ignored`.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mri_tumor_classifier::classifier::{
    Classifier, ClassifierConfig, ModelLoadError, ModelProvider,
    OnnxClassifierModel, ResizeFilter, NUM_CLASSES,
};
use ndarray::Array4;
use std::io::{Cursor, Write};
use std::path::PathBuf;

const DEFAULT_MODEL_PATH: &str = "./models/brain-tumor-classifier.onnx";

fn model_path() -> PathBuf {
    PathBuf::from(std::env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()))
}

fn jpeg_scan(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 7 + y * 3) % 256) as u8;
        Rgb([v, v, v])
    }));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

#[cfg(test)]
mod onnx_model_tests {
    use super::*;

    /// Test 1: Missing artifact is a load error, not a panic
    #[test]
    fn test_missing_artifact() {
        let result = OnnxClassifierModel::load("/nonexistent/brain-tumor-classifier.onnx", 1);
        match result {
            Err(ModelLoadError::NotFound(path)) => {
                assert!(path.ends_with("brain-tumor-classifier.onnx"))
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    /// Test 2: A file that is not an ONNX graph is rejected at load time
    #[test]
    fn test_corrupt_artifact() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x00\x01 this is not a protobuf graph").unwrap();

        let result = OnnxClassifierModel::load(file.path(), 1);
        assert!(matches!(result, Err(ModelLoadError::Runtime(_))));
    }

    /// Test 3: Real artifact loads and yields four probabilities
    #[test]
    #[ignore] // Requires the trained artifact at MODEL_PATH
    fn test_real_artifact_outputs() {
        let model = OnnxClassifierModel::load(model_path(), 2).unwrap();
        let scores = model.predict(&Array4::from_elem((1, 128, 128, 3), 0.5)).unwrap();

        assert_eq!(scores.len(), NUM_CLASSES);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3, "softmax outputs should sum to 1, got {}", sum);
    }

    /// Test 4: End-to-end classification is deterministic on the real artifact
    #[tokio::test]
    #[ignore] // Requires the trained artifact at MODEL_PATH
    async fn test_real_artifact_end_to_end() {
        let classifier = Classifier::new(ClassifierConfig {
            model_path: model_path(),
            resize_filter: ResizeFilter::Bicubic,
            intra_threads: 2,
        });
        classifier.initialize().await.unwrap();

        let scan = jpeg_scan(512, 512);
        let first = classifier.classify(&scan).unwrap();
        let second = classifier.classify(&scan).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.confidence_percent, first.scores[first.predicted_label.index()] * 100.0);
    }
}
