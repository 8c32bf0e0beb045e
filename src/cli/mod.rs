// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::classifier::{ClassifierConfig, ResizeFilter};

/// Brain MRI tumor classifier
#[derive(Parser, Debug)]
#[command(name = "mri-tumor-classifier")]
#[command(version)]
#[command(about = "Classify brain MRI scans into glioma, meningioma, pituitary or no tumor", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the model and serve the HTTP API
    Serve(ServeArgs),

    /// Classify local scan files and print one JSON result per line
    Classify(ClassifyArgs),
}

/// Classifier artifact settings shared by every command
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Path to the ONNX classifier
    #[arg(
        long,
        global = true,
        env = "MODEL_PATH",
        default_value = "./models/brain-tumor-classifier.onnx"
    )]
    pub model_path: PathBuf,

    /// Interpolation used when resizing to 128x128
    #[arg(long, global = true, env = "RESIZE_FILTER", value_enum, default_value_t = ResizeFilter::Bicubic)]
    pub resize_filter: ResizeFilter,

    /// ONNX Runtime intra-op threads
    #[arg(long, global = true, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl ModelArgs {
    pub fn to_classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            model_path: self.model_path.clone(),
            resize_filter: self.resize_filter,
            intra_threads: self.intra_threads,
        }
    }
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
        }
    }
}

impl ServeArgs {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Arguments for the classify command
#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// JPEG or PNG scans to classify
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.model.to_classifier_config();
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve(config, args).await,
        Some(Commands::Classify(args)) => commands::classify_files(config, args).await,
        None => commands::serve(config, ServeArgs::default()).await,
    }
}
