//! Test utilities for integration tests.
//!
//! This module provides helpers for building the application router over
//! temporary directories and for crafting multipart processing requests.

use std::io::Cursor;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use mapslicer::publish::{AssetPublisher, LocalAssetStore, RemoteAssetStore};
use mapslicer::server::{create_router, RouterConfig};
use mapslicer::workflow::SlicePipeline;

/// Upload cap used by every test app (10 MB).
pub const TEST_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart boundary used by the request builders.
pub const BOUNDARY: &str = "mapslicer-test-boundary";

// =============================================================================
// Application Setup
// =============================================================================

/// A router wired to pipeline directories inside one temp dir.
///
/// The temp dir must outlive the router, so both travel together.
pub struct TestApp {
    pub dir: TempDir,
    pub router: Router,
}

impl TestApp {
    /// Path of the archive output directory.
    pub fn output_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("output")
    }
}

/// Build a local-only test application.
pub fn test_app() -> TestApp {
    test_app_with_remote(None)
}

/// Build a test application, optionally mirroring to a remote endpoint.
pub fn test_app_with_remote(endpoint: Option<String>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().join("static/slices");

    let local = LocalAssetStore::new(&static_dir, "/static/slices");
    let remote = endpoint.map(|e| RemoteAssetStore::new(e.parse().unwrap(), None));
    let publisher = AssetPublisher::new(local, remote);

    let pipeline = SlicePipeline::new(
        publisher,
        dir.path().join("work"),
        dir.path().join("output"),
        TEST_MAX_UPLOAD_BYTES,
    );

    let router = create_router(
        pipeline,
        "/static/slices",
        &static_dir,
        RouterConfig::new(TEST_MAX_UPLOAD_BYTES).with_tracing(false),
    );

    TestApp { dir, router }
}

// =============================================================================
// Image Fixtures
// =============================================================================

/// Encode a solid-color PNG of the given dimensions.
pub fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([120, 40, 200, 255]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Whether `data` starts with the PNG signature.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
}

/// Whether `data` starts with the ZIP local-file signature.
pub fn is_valid_zip(data: &[u8]) -> bool {
    data.starts_with(b"PK")
}

// =============================================================================
// Request Builders
// =============================================================================

/// Build a multipart body from optional `image` and `map_html` parts.
///
/// Passing `None` for a part omits it, which lets tests exercise the
/// missing-part error paths.
pub fn multipart_body(image: Option<(&str, &[u8])>, map_html: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some((name, data)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(map) = map_html {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"map_html\"\r\n\r\n{}\r\n",
                BOUNDARY, map
            )
            .as_bytes(),
        );
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Build a `POST /process` request around a multipart body.
pub fn process_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Build a plain GET request.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
