// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every setting can be given as a command-line flag or through the
//! environment (a `.env` file is honoured by the binary).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::vision::{DetectorModelConfig, YoloParams};

/// Origins allowed by CORS when nothing else is configured (local dev servers)
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://127.0.0.1:8080",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

/// Smart Campus waste detection API
#[derive(Parser, Debug, Clone)]
#[command(name = "waste-detect-node")]
#[command(version)]
#[command(about = "HTTP API serving a waste-detection model", long_about = None)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory for original images
    #[arg(long, env = "UPLOAD_FOLDER", default_value = "uploads")]
    pub upload_folder: PathBuf,

    /// Directory for annotated images
    #[arg(long, env = "PROCESSED_FOLDER", default_value = "processed")]
    pub processed_folder: PathBuf,

    /// ONNX weights of the waste detection model
    #[arg(
        long,
        env = "MODEL_PATH",
        default_value = "yolov8n_waste_detection2/weights/model.onnx"
    )]
    pub model_path: PathBuf,

    /// Weights used when MODEL_PATH does not exist
    #[arg(long, env = "FALLBACK_MODEL_PATH", default_value = "yolov8n.onnx")]
    pub fallback_model_path: PathBuf,

    /// Class names, one per line
    #[arg(long, env = "LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.45)]
    pub iou_threshold: f32,

    /// Square model input size in pixels
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    #[arg(long, env = "MAX_DETECTIONS", default_value_t = 300)]
    pub max_detections: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "INFERENCE_THREADS", default_value_t = 4)]
    pub inference_threads: usize,

    /// Comma-separated CORS origins; `*` allows any
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Load the model at startup instead of on the first request
    #[arg(long, env = "PRELOAD_MODEL")]
    pub preload_model: bool,

    /// Request body cap in bytes; unlimited when unset
    #[arg(long, env = "MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub upload_folder: PathBuf,
    pub processed_folder: PathBuf,
    pub model: DetectorModelConfig,
    pub labels_path: Option<PathBuf>,
    pub yolo: YoloParams,
    pub cors_origins: Vec<String>,
    pub preload_model: bool,
    pub max_upload_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            upload_folder: PathBuf::from("uploads"),
            processed_folder: PathBuf::from("processed"),
            model: DetectorModelConfig::default(),
            labels_path: None,
            yolo: YoloParams::default(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            preload_model: false,
            max_upload_bytes: None,
        }
    }
}

impl ServerConfig {
    /// Build and validate configuration from parsed arguments
    pub fn from_args(args: ServerArgs) -> Result<Self> {
        let bind_addr: SocketAddr = format!("{}:{}", args.host, args.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", args.host, args.port))?;

        let cors_origins: Vec<String> = args
            .cors_origins
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let config = Self {
            bind_addr,
            upload_folder: args.upload_folder,
            processed_folder: args.processed_folder,
            model: DetectorModelConfig {
                weights_path: args.model_path,
                fallback_weights: args.fallback_model_path,
            },
            labels_path: args.labels_path,
            yolo: YoloParams {
                input_size: args.input_size,
                confidence_threshold: args.confidence_threshold,
                iou_threshold: args.iou_threshold,
                max_detections: args.max_detections,
                threads: args.inference_threads,
            },
            cors_origins: if cors_origins.is_empty() {
                DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()
            } else {
                cors_origins
            },
            preload_model: args.preload_model,
            max_upload_bytes: args.max_upload_bytes,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.yolo.confidence_threshold) {
            bail!(
                "Confidence threshold must be within [0, 1], got {}",
                self.yolo.confidence_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.yolo.iou_threshold) {
            bail!(
                "IoU threshold must be within [0, 1], got {}",
                self.yolo.iou_threshold
            );
        }
        if self.yolo.input_size == 0 {
            bail!("Model input size must be greater than 0");
        }
        if self.yolo.max_detections == 0 {
            bail!("Max detections must be greater than 0");
        }
        if self.yolo.threads == 0 {
            bail!("Inference threads must be greater than 0");
        }
        if self.upload_folder == self.processed_folder {
            bail!("Upload and processed folders must differ");
        }
        Ok(())
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
