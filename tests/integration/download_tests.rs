//! Integration tests for archive downloads.
//!
//! Tests verify:
//! - Produced archives are downloadable with the right headers
//! - Path traversal in the filename is rejected
//! - Missing archives return a JSON 404

use axum::http::StatusCode;
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::test_utils::{
    get_request, is_valid_zip, multipart_body, process_request, test_app, test_png,
};

#[tokio::test]
async fn test_download_after_processing_returns_zip() {
    let app = test_app();

    let map = r#"<area shape="rect" coords="0,0,100,100" href="https://a.test">"#;
    let body = multipart_body(Some(("banner.png", &test_png(100, 100))), Some(map));
    let response = app
        .router
        .clone()
        .oneshot(process_request(body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let download_url = json["download_url"].as_str().unwrap();
    assert!(download_url.starts_with("/download/"));

    let response = app
        .router
        .clone()
        .oneshot(get_request(download_url))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/zip"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_zip(&body));
}

#[tokio::test]
async fn test_download_rejects_path_traversal() {
    let app = test_app();

    // Write a file outside the output dir that a traversal would reach
    std::fs::write(app.dir.path().join("secret.zip"), b"secret").unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get_request("/download/..%2Fsecret.zip"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn test_download_missing_archive_is_not_found() {
    let app = test_app();

    let response = app
        .router
        .oneshot(get_request("/download/email_template_missing.zip"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "not_found");
}
