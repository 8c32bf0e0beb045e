// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the tumor classifier
//!
//! Steps (must match what the artifact saw during training):
//! 1. Convert to 3-channel RGB (alpha dropped, grayscale replicated)
//! 2. Resize to exactly 128x128, aspect ratio not preserved
//! 3. Scale every channel to [0, 1] by dividing by 255.0
//! 4. Lay out as NHWC tensor [1, 128, 128, 3]

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::model::InferenceError;

/// Square input size of the classifier
pub const INPUT_SIZE: u32 = 128;

/// RGB
pub const NUM_CHANNELS: usize = 3;

/// Tensor shape expected by the artifact (NHWC)
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, NUM_CHANNELS];

/// Interpolation used when resizing to the input size.
///
/// This is pinned per artifact: a model trained on bicubic-resized scans
/// must be served with bicubic resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    #[default]
    Bicubic,
    Lanczos3,
}

impl ResizeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            ResizeFilter::Nearest => "nearest",
            ResizeFilter::Bilinear => "bilinear",
            ResizeFilter::Bicubic => "bicubic",
            ResizeFilter::Lanczos3 => "lanczos3",
        }
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
            // Keys cubic with a = -0.5, same kernel as PIL's BICUBIC
            ResizeFilter::Bicubic => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "bilinear" | "triangle" => Ok(ResizeFilter::Bilinear),
            "bicubic" | "catmullrom" => Ok(ResizeFilter::Bicubic),
            "lanczos3" | "lanczos" => Ok(ResizeFilter::Lanczos3),
            other => Err(format!(
                "unknown resize filter '{}', expected one of: nearest, bilinear, bicubic, lanczos3",
                other
            )),
        }
    }
}

/// A batch of one preprocessed scan, shape [1, 128, 128, 3], values in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array4<f32>);

impl NormalizedTensor {
    /// Wrap an array, checking shape and value range
    pub fn from_array(array: Array4<f32>) -> Result<Self, InferenceError> {
        let tensor = Self(array);
        tensor.validate()?;
        Ok(tensor)
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.0
    }

    pub fn into_array(self) -> Array4<f32> {
        self.0
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    /// Check the tensor against the artifact's input contract
    pub fn validate(&self) -> Result<(), InferenceError> {
        check_input_shape(self.shape())?;

        if let Some((position, value)) = self
            .0
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(InferenceError::ValueOutOfRange {
                index: position,
                value: *value,
            });
        }

        Ok(())
    }
}

/// Reject any shape other than [`INPUT_SHAPE`]
pub fn check_input_shape(shape: &[usize]) -> Result<(), InferenceError> {
    if shape != INPUT_SHAPE {
        return Err(InferenceError::ShapeMismatch {
            expected: INPUT_SHAPE.to_vec(),
            actual: shape.to_vec(),
        });
    }
    Ok(())
}

/// Force exactly three 8-bit channels
pub fn to_rgb(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

/// Resize to the classifier input size with the pinned filter
pub fn resize_to_input(rgb: &RgbImage, filter: ResizeFilter) -> RgbImage {
    image::imageops::resize(rgb, INPUT_SIZE, INPUT_SIZE, filter.into())
}

/// Preprocess a decoded scan into the classifier input tensor
pub fn preprocess(
    image: &DynamicImage,
    filter: ResizeFilter,
) -> Result<NormalizedTensor, InferenceError> {
    let rgb = to_rgb(image);
    let resized = resize_to_input(&rgb, filter);
    let actual = vec![
        1,
        resized.height() as usize,
        resized.width() as usize,
        NUM_CHANNELS,
    ];

    // RgbImage is row-major interleaved RGB, i.e. already HWC
    let values: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    let array = Array4::from_shape_vec(INPUT_SHAPE, values).map_err(|_| {
        InferenceError::ShapeMismatch {
            expected: INPUT_SHAPE.to_vec(),
            actual,
        }
    })?;

    NormalizedTensor::from_array(array)
}
