// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Health probe tests for GET /api/health and GET /health
//!
//! The probe only checks the weights file on disk and must never load the
//! model.

use axum::http::StatusCode;
use tower::util::ServiceExt;

use super::common::{body_json, get_request, TestContext};

#[tokio::test]
async fn test_health_reports_missing_weights() {
    let ctx = TestContext::without_weights().await;

    let response = ctx.app().oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_found"], false);
    assert_eq!(body["model_loaded"], false);
    // Configured weights absent, so the fallback is reported
    assert!(body["model_path"].as_str().unwrap().ends_with("yolov8n.onnx"));
}

#[tokio::test]
async fn test_health_reports_present_weights() {
    let ctx = TestContext::new().await;

    let response = ctx.app().oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["model_found"], true);
    assert_eq!(
        body["model_path"],
        ctx.weights_path.display().to_string()
    );
}

#[tokio::test]
async fn test_health_does_not_load_model() {
    let ctx = TestContext::new().await;

    for uri in ["/api/health", "/health", "/api/health"] {
        let response = ctx.app().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(ctx.loader.load_count(), 0);
    assert!(!ctx.state.detector.is_loaded());
}

#[tokio::test]
async fn test_health_alias_matches() {
    let ctx = TestContext::new().await;

    let primary = body_json(ctx.app().oneshot(get_request("/api/health")).await.unwrap()).await;
    let alias = body_json(ctx.app().oneshot(get_request("/health")).await.unwrap()).await;
    assert_eq!(primary, alias);
}

#[tokio::test]
async fn test_health_reports_loaded_after_preload() {
    let ctx = TestContext::new().await;
    ctx.state.detector.preload().await.unwrap();

    let body = body_json(ctx.app().oneshot(get_request("/api/health")).await.unwrap()).await;
    assert_eq!(body["model_loaded"], true);
}
