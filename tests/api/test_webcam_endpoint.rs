// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Webcam detection tests for POST /api/webcam

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;
use serde_json::json;
use tower::util::ServiceExt;

use super::common::{body_bytes, body_json, encoded, get_request, json_request, TestContext};

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[tokio::test]
async fn test_webcam_jpeg_frame() {
    let ctx = TestContext::new().await;
    let frame = data_url("image/jpeg", &encoded(ImageFormat::Jpeg));

    let response = ctx
        .app()
        .oneshot(json_request("/api/webcam", &json!({ "image": frame })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let url = body["processed_image_url"].as_str().unwrap();
    assert!(url.starts_with("/api/processed/processed_webcam_"));
    assert!(url.ends_with(".jpg"));

    let response = ctx.app().oneshot(get_request(url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response).await;
    assert!(image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).is_ok());
}

#[tokio::test]
async fn test_webcam_png_frame_is_stored_as_jpeg() {
    let ctx = TestContext::new().await;
    let frame = data_url("image/png", &encoded(ImageFormat::Png));

    let response = ctx
        .app()
        .oneshot(json_request("/api/webcam", &json!({ "image": frame })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let url = body["processed_image_url"].as_str().unwrap();
    let original = url.replace("/api/processed/processed_", "/api/uploads/");

    let response = ctx.app().oneshot(get_request(&original)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    let bytes = body_bytes(response).await;
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn test_webcam_missing_image() {
    let ctx = TestContext::new().await;

    for body in [json!({}), json!({ "image": "" }), json!({ "image": null })] {
        let response = ctx
            .app()
            .oneshot(json_request("/api/webcam", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No image data received");
    }
    assert_eq!(ctx.loader.load_count(), 0);
}

#[tokio::test]
async fn test_webcam_non_json_body() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/webcam")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let response = ctx.app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No image data received");
}

#[tokio::test]
async fn test_webcam_payload_without_comma() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app()
        .oneshot(json_request("/api/webcam", &json!({ "image": "garbage" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Detection failed: "), "got {}", error);
}

#[tokio::test]
async fn test_webcam_invalid_base64() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app()
        .oneshot(json_request(
            "/api/webcam",
            &json!({ "image": "data:image/jpeg;base64,@@@@" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_webcam_without_weights() {
    let ctx = TestContext::without_weights().await;
    let frame = data_url("image/jpeg", &encoded(ImageFormat::Jpeg));

    let response = ctx
        .app()
        .oneshot(json_request("/api/webcam", &json!({ "image": frame })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Model not loaded");
}
