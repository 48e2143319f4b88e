// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Upload detection tests for POST /api/predict

use axum::http::StatusCode;
use image::ImageFormat;
use tower::util::ServiceExt;

use super::common::{
    body_bytes, body_json, encoded, get_request, predict_request, CountingLoader, TestContext,
};
use std::time::Duration;

#[tokio::test]
async fn test_predict_png_returns_resolvable_urls() {
    let ctx = TestContext::new().await;
    let upload = encoded(ImageFormat::Png);

    let response = ctx
        .app()
        .oneshot(predict_request("file", "bottle.png", &upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let original_url = body["original_url"].as_str().unwrap().to_string();
    let processed_url = body["processed_url"].as_str().unwrap().to_string();

    assert!(original_url.starts_with("/api/uploads/"));
    assert!(original_url.ends_with(".png"));
    let original_name = original_url.trim_start_matches("/api/uploads/");
    assert_eq!(
        processed_url,
        format!("/api/processed/processed_{}", original_name)
    );

    // Original is stored byte-for-byte
    let response = ctx.app().oneshot(get_request(&original_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, upload);

    // Processed copy decodes as PNG with the same dimensions
    let response = ctx.app().oneshot(get_request(&processed_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let processed = body_bytes(response).await;
    let decoded = image::load_from_memory_with_format(&processed, ImageFormat::Png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
}

#[tokio::test]
async fn test_predict_accepts_jpeg_extensions() {
    let ctx = TestContext::new().await;
    let upload = encoded(ImageFormat::Jpeg);

    for (filename, ext) in [("can.jpg", ".jpg"), ("can.JPEG", ".JPEG")] {
        let response = ctx
            .app()
            .oneshot(predict_request("file", filename, &upload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "upload {}", filename);

        let body = body_json(response).await;
        let processed_url = body["processed_url"].as_str().unwrap();
        assert!(processed_url.ends_with(ext));

        let response = ctx.app().oneshot(get_request(processed_url)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/jpeg");
    }

    // One load shared by both requests
    assert_eq!(ctx.loader.load_count(), 1);
}

#[tokio::test]
async fn test_predict_keeps_client_extension_case() {
    let ctx = TestContext::new().await;
    let upload = encoded(ImageFormat::Png);

    let response = ctx
        .app()
        .oneshot(predict_request("file", "Bottle.PNG", &upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["original_url"].as_str().unwrap().ends_with(".PNG"));
    let processed_url = body["processed_url"].as_str().unwrap();
    assert!(processed_url.ends_with(".PNG"));

    let response = ctx.app().oneshot(get_request(processed_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
}

#[tokio::test]
async fn test_predict_jpeg_content_with_png_name() {
    let ctx = TestContext::new().await;
    let upload = encoded(ImageFormat::Jpeg);

    let response = ctx
        .app()
        .oneshot(predict_request("file", "x.png", &upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Annotated copy follows the stored name and is written as PNG
    let body = body_json(response).await;
    let processed_url = body["processed_url"].as_str().unwrap();
    let response = ctx.app().oneshot(get_request(processed_url)).await.unwrap();
    let processed = body_bytes(response).await;
    assert_eq!(image::guess_format(&processed).unwrap(), ImageFormat::Png);
}

#[tokio::test]
async fn test_predict_rejects_invalid_file_type() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app()
        .oneshot(predict_request("file", "notes.txt", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid file type.");

    // Validation happens before the model is touched
    assert_eq!(ctx.loader.load_count(), 0);
}

#[tokio::test]
async fn test_predict_rejects_empty_filename() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app()
        .oneshot(predict_request("file", "", b"hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file selected.");
}

#[tokio::test]
async fn test_predict_rejects_missing_file_part() {
    let ctx = TestContext::new().await;
    let upload = encoded(ImageFormat::Png);

    let response = ctx
        .app()
        .oneshot(predict_request("photo", "bottle.png", &upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file selected.");
}

#[tokio::test]
async fn test_predict_without_weights_reports_model_not_loaded() {
    let ctx = TestContext::without_weights().await;
    let upload = encoded(ImageFormat::Png);

    let response = ctx
        .app()
        .oneshot(predict_request("file", "bottle.png", &upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Model not loaded");
}

#[tokio::test]
async fn test_predict_retries_load_once_weights_appear() {
    let ctx = TestContext::without_weights().await;
    let upload = encoded(ImageFormat::Png);

    let response = ctx
        .app()
        .oneshot(predict_request("file", "bottle.png", &upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    std::fs::create_dir_all(ctx.weights_path.parent().unwrap()).unwrap();
    std::fs::write(&ctx.weights_path, b"onnx").unwrap();

    let response = ctx
        .app()
        .oneshot(predict_request("file", "bottle.png", &upload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ctx.loader.load_count(), 2);
}

#[tokio::test]
async fn test_predict_undecodable_image_fails_detection() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app()
        .oneshot(predict_request("file", "bottle.png", b"definitely not a png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Detection failed: "), "got {}", error);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_share_one_load() {
    let ctx = TestContext::with_loader(CountingLoader::with_delay(Duration::from_millis(100))).await;
    let upload = encoded(ImageFormat::Png);

    let first = ctx
        .app()
        .oneshot(predict_request("file", "a.png", &upload));
    let second = ctx
        .app()
        .oneshot(predict_request("file", "b.png", &upload));
    let (first, second) = tokio::join!(first, second);

    let first = body_json(first.unwrap()).await;
    let second = body_json(second.unwrap()).await;
    assert!(first["processed_url"].is_string());
    assert!(second["processed_url"].is_string());
    assert_ne!(first["original_url"], second["original_url"]);

    assert_eq!(ctx.loader.load_count(), 1);
}
