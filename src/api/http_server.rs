// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{files, health, predict, webcam};
use crate::config::ServerConfig;
use crate::storage::ImageStore;
use crate::vision::{DetectorLoader, DetectorManager, YoloLoader};

/// Shared state handed to every handler
pub struct AppState {
    pub config: ServerConfig,
    pub store: ImageStore,
    pub detector: DetectorManager,
}

impl AppState {
    /// Build state from configuration, using the YOLO/ONNX loader
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let loader = YoloLoader::new(config.yolo.clone(), config.labels_path.clone());
        Self::with_loader(config, Arc::new(loader)).await
    }

    /// Build state with a caller-provided detector loader
    pub async fn with_loader(
        config: ServerConfig,
        loader: Arc<dyn DetectorLoader>,
    ) -> anyhow::Result<Self> {
        let store = ImageStore::open(&config.upload_folder, &config.processed_folder).await?;
        let detector = DetectorManager::new(config.model.clone(), loader);
        Ok(Self {
            config,
            store,
            detector,
        })
    }
}

/// Assemble the router with all routes and middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = match state.config.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };
    let cors = cors_layer(&state.config);

    Router::new()
        // Health check (+ legacy alias)
        .route("/api/health", get(health::health_handler))
        .route("/health", get(health::health_handler))
        // Detection
        .route("/api/predict", post(predict::predict_handler))
        .route("/api/webcam", post(webcam::webcam_handler))
        // Stored images
        .route("/api/uploads/:filename", get(files::uploaded_file_handler))
        .route("/api/processed/:filename", get(files::processed_file_handler))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Bind and serve until Ctrl-C
pub async fn start_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.bind_addr;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
