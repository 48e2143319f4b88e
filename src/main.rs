// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::{env, sync::Arc};
use waste_detect_node::{
    api::{start_server, AppState},
    config::{ServerArgs, ServerConfig},
    version,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting {}...\n", version::get_version_string());

    let args = ServerArgs::parse();
    let config = ServerConfig::from_args(args).context("Invalid configuration")?;

    let state = Arc::new(AppState::new(config).await?);

    let weights = state.detector.resolve_weights_path();
    println!("📁 Uploads:    {}", state.config.upload_folder.display());
    println!("📁 Processed:  {}", state.config.processed_folder.display());
    println!("🧠 Weights:    {}", weights.display());

    if state.config.preload_model {
        println!("🧠 Preloading detection model...");
        match state.detector.preload().await {
            Ok(()) => println!("✅ Model loaded"),
            Err(e) => {
                // Requests will retry the load
                tracing::warn!("Model preload failed: {}", e);
                println!("⚠️  Model not loaded yet: {}", e);
            }
        }
    }

    println!("\n🌐 API server on http://{}", state.config.bind_addr);
    for (method, path) in version::ENDPOINTS {
        println!("   {:<5} {}", method, path);
    }
    println!();

    start_server(state).await
}
