// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Stored image serving tests for GET /api/uploads/:f and GET /api/processed/:f

use axum::http::StatusCode;
use tower::util::ServiceExt;

use super::common::{body_bytes, body_json, get_request, TestContext};
use waste_detect_node::storage::{Folder, ImageExtension};

#[tokio::test]
async fn test_serves_stored_upload() {
    let ctx = TestContext::new().await;
    let stored = ctx
        .state
        .store
        .save(Folder::Uploads, b"png bytes", "", ImageExtension::Png)
        .await
        .unwrap();

    let response = ctx.app().oneshot(get_request(&stored.url())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(body_bytes(response).await, b"png bytes");
}

#[tokio::test]
async fn test_missing_processed_file() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app()
        .oneshot(get_request("/api/processed/processed_nope.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "File not found");
}

#[tokio::test]
async fn test_folders_are_separate() {
    let ctx = TestContext::new().await;
    let stored = ctx
        .state
        .store
        .save(Folder::Uploads, b"jpeg bytes", "", ImageExtension::Jpg)
        .await
        .unwrap();

    let response = ctx
        .app()
        .oneshot(get_request(&format!("/api/processed/{}", stored.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_is_not_served() {
    let ctx = TestContext::new().await;

    let response = ctx
        .app()
        .oneshot(get_request("/api/uploads/..%2F..%2Fetc%2Fpasswd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
