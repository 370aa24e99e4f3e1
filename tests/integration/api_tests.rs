//! API integration tests for the processing endpoint.
//!
//! Tests verify:
//! - Successful processing over the real router (multipart upload)
//! - Warning accumulation for malformed and clamped regions
//! - Error cases (missing parts, unsupported formats, no valid regions)
//! - Remote mirroring against a mock hosting endpoint

use axum::http::StatusCode;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use tower::ServiceExt;

use super::test_utils::{
    get_request, is_valid_png, multipart_body, process_request, test_app, test_app_with_remote,
    test_png,
};

const THREE_STACKED: &str = r#"
    <area shape="rect" coords="0,0,300,150" href="https://example.com/a" alt="Top">
    <area shape="rect" coords="0,150,300,300" href="https://example.com/b" alt="Middle">
    <area shape="rect" coords="0,300,300,450" href="https://example.com/c" alt="Bottom">
"#;

// =============================================================================
// Successful Processing
// =============================================================================

#[tokio::test]
async fn test_process_three_stacked_regions() {
    let app = test_app();

    let body = multipart_body(Some(("banner.png", &test_png(300, 450))), Some(THREE_STACKED));
    let response = app
        .router
        .clone()
        .oneshot(process_request(body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["slice_count"], 3);
    assert_eq!(json["assets"].as_array().unwrap().len(), 3);
    assert_eq!(json["warnings"]["skipped_tags"], 0);

    // Each stacked region spans the full width
    let html = json["html"].as_str().unwrap();
    assert_eq!(html.matches("width:100.00%").count(), 3);
    assert_eq!(html.matches("<a href=").count(), 3);

    // Assets are ordered and served through the static route
    for (i, asset) in json["assets"].as_array().unwrap().iter().enumerate() {
        assert_eq!(asset["index"], i);
        assert_eq!(asset["backend"], "local");

        let url = asset["url"].as_str().unwrap();
        let slice_response = app
            .router
            .clone()
            .oneshot(get_request(url))
            .await
            .unwrap();
        assert_eq!(slice_response.status(), StatusCode::OK);

        let slice_body = slice_response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();
        assert!(is_valid_png(&slice_body));
    }
}

#[tokio::test]
async fn test_process_malformed_tag_among_valid_ones() {
    let app = test_app();

    let map = r#"
        <area shape="rect" coords="0,0,300,150" href="https://a.test">
        <area shape="rect" coords="0,150,300" href="https://broken.test">
        <area shape="rect" coords="0,150,300,300" href="https://b.test">
    "#;
    let body = multipart_body(Some(("banner.png", &test_png(300, 300))), Some(map));
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["slice_count"], 2);
    assert_eq!(json["warnings"]["skipped_tags"], 1);
    assert_eq!(json["warnings"]["messages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_process_clamped_region_warns() {
    let app = test_app();

    // Bottom edge 50px past the 450px-high image
    let map = r#"<area shape="rect" coords="0,400,300,500" href="https://a.test">"#;
    let body = multipart_body(Some(("banner.png", &test_png(300, 450))), Some(map));
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["slice_count"], 1);
    assert_eq!(json["warnings"]["clamped_regions"], 1);
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_process_no_valid_tags_is_unprocessable() {
    let app = test_app();

    let body = multipart_body(
        Some(("banner.png", &test_png(100, 100))),
        Some("<p>no areas here</p>"),
    );
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "no_valid_regions");
    assert_eq!(json["stage"], "validated");
}

#[tokio::test]
async fn test_process_missing_image_part() {
    let app = test_app();

    let body = multipart_body(None, Some(THREE_STACKED));
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "invalid_request");
    assert_eq!(json["stage"], "received");
}

#[tokio::test]
async fn test_process_missing_map_part() {
    let app = test_app();

    let body = multipart_body(Some(("banner.png", &test_png(100, 100))), None);
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_unsupported_extension() {
    let app = test_app();

    let body = multipart_body(
        Some(("banner.tiff", &test_png(100, 100))),
        Some(THREE_STACKED),
    );
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "unsupported_media_type");
}

#[tokio::test]
async fn test_process_undecodable_image() {
    let app = test_app();

    let body = multipart_body(Some(("banner.png", b"not a png")), Some(THREE_STACKED));
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Remote Mirroring
// =============================================================================

#[tokio::test]
async fn test_process_mirrors_to_remote_host() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"url": "https://cdn.test/hosted.png"}"#);
        })
        .await;

    let app = test_app_with_remote(Some(server.url("/upload")));

    let map = r#"<area shape="rect" coords="0,0,100,100" href="https://a.test">"#;
    let body = multipart_body(Some(("banner.png", &test_png(100, 100))), Some(map));
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["assets"][0]["backend"], "remote");
    assert_eq!(json["assets"][0]["url"], "https://cdn.test/hosted.png");
    // The generated markup references the winning remote URL
    assert!(json["html"]
        .as_str()
        .unwrap()
        .contains("https://cdn.test/hosted.png"));
}

#[tokio::test]
async fn test_process_remote_failure_falls_back_to_local() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/upload");
            then.status(503);
        })
        .await;

    let app = test_app_with_remote(Some(server.url("/upload")));

    let map = r#"<area shape="rect" coords="0,0,100,100" href="https://a.test">"#;
    let body = multipart_body(Some(("banner.png", &test_png(100, 100))), Some(map));
    let response = app.router.oneshot(process_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["assets"][0]["backend"], "local");
    assert_eq!(json["warnings"]["publish_fallbacks"], 1);
}

// =============================================================================
// Service Pages
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let response = app.router.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].as_str().is_some());
}

#[tokio::test]
async fn test_index_serves_upload_form() {
    let app = test_app();

    let response = app.router.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("name=\"image\""));
    assert!(html.contains("name=\"map_html\""));
}
