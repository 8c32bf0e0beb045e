// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify request types and validation

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::classifier::image_utils::MAX_IMAGE_SIZE;

/// Accepted upload formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg"];

/// Base64 length of the largest accepted image
const MAX_BASE64_SIZE: usize = MAX_IMAGE_SIZE.div_ceil(3) * 4;

fn default_format() -> String {
    "png".to_string()
}

/// JSON request for classifying one MRI scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    /// Base64-encoded image data
    #[serde(default)]
    pub image: Option<String>,

    /// Image format hint (png, jpg, jpeg); the actual format is sniffed
    /// and a disagreeing hint is only logged
    #[serde(default = "default_format")]
    pub format: String,
}

impl ClassifyRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let image = match self.image.as_deref() {
            Some(image) if !image.is_empty() => image,
            _ => {
                return Err(ApiError::ValidationError {
                    field: "image".to_string(),
                    message: "image is required".to_string(),
                })
            }
        };

        if image.len() > MAX_BASE64_SIZE {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: format!("image exceeds maximum size of {} bytes", MAX_IMAGE_SIZE),
            });
        }

        if !SUPPORTED_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ApiError::ValidationError {
                field: "format".to_string(),
                message: format!(
                    "unsupported format '{}', supported: {:?}",
                    self.format, SUPPORTED_FORMATS
                ),
            });
        }

        Ok(())
    }

    /// Format named by the `format` hint
    pub fn format_hint(&self) -> Option<ImageFormat> {
        match self.format.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// True when the hint agrees with the format detected from the bytes
    pub fn hint_matches(&self, detected: ImageFormat) -> bool {
        self.format_hint() == Some(detected)
    }
}
