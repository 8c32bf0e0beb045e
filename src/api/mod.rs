// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod classify;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use classify::{
    classify_handler, classify_upload_handler, ClassScore, ClassifyRequest, ClassifyResponse,
};
pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use handlers::{HealthResponse, LabelInfo, LabelsResponse};
pub use http_server::{create_router, start_server, AppState};
