// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnostic class labels
//!
//! The declaration order is the index order of the classifier's output
//! vector and must not change without retraining the artifact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of classes the artifact predicts
pub const NUM_CLASSES: usize = 4;

/// One of the four diagnostic categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    #[serde(rename = "glioma")]
    Glioma,
    #[serde(rename = "meningioma")]
    Meningioma,
    #[serde(rename = "no tumor")]
    NoTumor,
    #[serde(rename = "pituitary")]
    Pituitary,
}

/// All labels in model output order
pub const CLASS_LABELS: [ClassLabel; NUM_CLASSES] = [
    ClassLabel::Glioma,
    ClassLabel::Meningioma,
    ClassLabel::NoTumor,
    ClassLabel::Pituitary,
];

impl ClassLabel {
    /// Label at a position of the model output vector
    pub fn from_index(index: usize) -> Option<Self> {
        CLASS_LABELS.get(index).copied()
    }

    /// Position of this label in the model output vector
    pub fn index(self) -> usize {
        match self {
            ClassLabel::Glioma => 0,
            ClassLabel::Meningioma => 1,
            ClassLabel::NoTumor => 2,
            ClassLabel::Pituitary => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Glioma => "glioma",
            ClassLabel::Meningioma => "meningioma",
            ClassLabel::NoTumor => "no tumor",
            ClassLabel::Pituitary => "pituitary",
        }
    }

    /// Every class except `no tumor` is a tumor finding
    pub fn is_tumor(self) -> bool {
        self != ClassLabel::NoTumor
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
