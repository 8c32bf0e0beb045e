// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{ClassifyArgs, ServeArgs};
use crate::api::classify::ClassifyResponse;
use crate::api::start_server;
use crate::classifier::{Classifier, ClassifierConfig};

/// One line of `classify` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileClassification {
    pub file: String,
    #[serde(flatten)]
    pub response: ClassifyResponse,
}

/// Load the artifact eagerly, then serve until shutdown.
///
/// A load failure aborts startup.
pub async fn serve(config: ClassifierConfig, args: ServeArgs) -> Result<()> {
    let classifier = Arc::new(Classifier::new(config));
    classifier
        .initialize()
        .await
        .context("Failed to load classifier model")?;

    info!(
        "Classifier ready (model: {}, resize filter: {})",
        classifier.model_source(),
        classifier.resize_filter()
    );

    start_server(classifier, args.socket_addr()).await
}

/// Classify each file, printing one JSON line per success.
///
/// Unreadable or undecodable files are logged and skipped; the command
/// fails at the end if any file failed.
pub async fn classify_files(config: ClassifierConfig, args: ClassifyArgs) -> Result<()> {
    let classifier = Arc::new(Classifier::new(config));
    classifier
        .initialize()
        .await
        .context("Failed to load classifier model")?;

    let model = classifier.model_source();
    let mut failed = 0usize;

    for path in &args.files {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let start = Instant::now();
        let worker = classifier.clone();
        let outcome = tokio::task::spawn_blocking(move || worker.classify(&bytes))
            .await
            .context("classification task failed")?;

        match outcome {
            Ok(result) => {
                let line = FileClassification {
                    file: path.display().to_string(),
                    response: ClassifyResponse::new(
                        Uuid::new_v4().to_string(),
                        &result,
                        start.elapsed().as_millis() as u64,
                        &model,
                    ),
                };
                println!("{}", serde_json::to_string(&line)?);
            }
            Err(e) if e.is_client_error() => {
                warn!("Skipping {}: {}", path.display(), e);
                failed += 1;
            }
            Err(e) => {
                error!("Classification of {} failed: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} scans could not be classified", failed, args.files.len()));
    }
    Ok(())
}
