// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify API endpoint module
//!
//! Provides POST /v1/classify (base64 JSON) and POST /v1/classify/upload
//! (multipart) for classifying brain MRI scans.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{classify_handler, classify_upload_handler};
pub use request::{ClassifyRequest, SUPPORTED_FORMATS};
pub use response::{advisory_message, ClassScore, ClassifyResponse, DISCLAIMER};
