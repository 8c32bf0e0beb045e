// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the MRI tumor classifier

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-04";

/// Model input contract served by this build
pub const MODEL_INPUT: &str = "float32[1,128,128,3] NHWC, scaled to [0,1]";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "onnx-runtime-cpu",
    "jpeg-png-decode",
    "configurable-resize-filter",
    "json-base64-upload",
    "multipart-upload",
    "batch-cli",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("MRI Tumor Classifier {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "date": BUILD_DATE,
        "modelInput": MODEL_INPUT,
        "features": FEATURES,
    })
}
