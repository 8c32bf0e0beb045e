// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! One-time loading of the classifier artifact
//!
//! The artifact is loaded at most once per `ModelManager`, even when many
//! requests race to be first. After a successful load the model is never
//! replaced.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::model::{ModelLoadError, ModelProvider, OnnxClassifierModel};

/// Produces a ready-to-use model provider
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ModelProvider>, ModelLoadError>;

    /// Human readable description for logs and `/health`
    fn describe(&self) -> String;
}

/// Loads [`OnnxClassifierModel`] from disk
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    pub model_path: PathBuf,
    pub intra_threads: usize,
}

#[async_trait]
impl ModelLoader for OnnxModelLoader {
    async fn load(&self) -> Result<Arc<dyn ModelProvider>, ModelLoadError> {
        let model_path = self.model_path.clone();
        let intra_threads = self.intra_threads;

        // Session creation is blocking and can take a while for large graphs
        let model = tokio::task::spawn_blocking(move || {
            OnnxClassifierModel::load(model_path, intra_threads)
        })
        .await
        .map_err(|e| ModelLoadError::Runtime(format!("model loading task failed: {}", e)))??;

        Ok(Arc::new(model))
    }

    fn describe(&self) -> String {
        self.model_path.display().to_string()
    }
}

/// Owns the loaded classifier for the life of the process
pub struct ModelManager {
    loader: Box<dyn ModelLoader>,
    model: OnceCell<Arc<dyn ModelProvider>>,
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("source", &self.loader.describe())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ModelManager {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            model: OnceCell::new(),
        }
    }

    /// Load the artifact if it has not been loaded yet.
    ///
    /// Concurrent callers wait on the same load. A failed load leaves the
    /// manager empty so the error is reported to every caller.
    pub async fn initialize(&self) -> Result<Arc<dyn ModelProvider>, ModelLoadError> {
        self.model
            .get_or_try_init(|| async {
                info!("Loading classifier artifact from {}", self.loader.describe());
                match self.loader.load().await {
                    Ok(model) => Ok(model),
                    Err(e) => {
                        error!("Failed to load classifier artifact: {}", e);
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }

    /// The loaded model, if `initialize` has succeeded
    pub fn get(&self) -> Option<Arc<dyn ModelProvider>> {
        self.model.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    pub fn source(&self) -> String {
        self.loader.describe()
    }
}
