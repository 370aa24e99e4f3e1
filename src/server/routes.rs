//! Router configuration for the slicing service.
//!
//! This module defines the HTTP routes and applies middleware for CORS and
//! request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /                        - Upload form page
//! /process                 - Run the pipeline (multipart POST)
//! /download/{filename}     - Download a produced archive
//! /static/...              - Locally published slice files
//! /health                  - Health check
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mapslicer::publish::{AssetPublisher, LocalAssetStore};
//! use mapslicer::server::routes::{create_router, RouterConfig};
//! use mapslicer::workflow::SlicePipeline;
//!
//! let publisher = AssetPublisher::new(
//!     LocalAssetStore::new("static/slices", "/static/slices"),
//!     None,
//! );
//! let pipeline = SlicePipeline::new(publisher, "work", "output", 10 << 20);
//!
//! let router = create_router(pipeline, "/static/slices", "static/slices", RouterConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    download_handler, health_handler, index_handler, process_handler, AppState,
};
use crate::workflow::SlicePipeline;

/// Headroom added to the body limit for multipart framing overhead.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Maximum accepted image upload size in bytes
    pub max_upload_bytes: usize,
}

impl RouterConfig {
    /// Create a router configuration with the given upload cap.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(max_upload_bytes: usize) -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
            max_upload_bytes,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_UPLOAD_BYTES)
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - The upload page and processing endpoint
/// - Archive download and static slice serving
/// - CORS configuration
/// - Request tracing (optional)
///
/// # Arguments
///
/// * `pipeline` - The pipeline handling processing requests
/// * `static_route` - URL prefix locally published slices are served under
///   (the publisher's public prefix, e.g. `/static/slices`)
/// * `static_root` - Directory served under `static_route`
/// * `config` - Router configuration
pub fn create_router(
    pipeline: SlicePipeline,
    static_route: &str,
    static_root: impl Into<PathBuf>,
    config: RouterConfig,
) -> Router {
    let app_state = AppState::new(pipeline);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route(
            "/process",
            post(process_handler).layer(DefaultBodyLimit::max(
                config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route("/download/{filename}", get(download_handler))
        .nest_service(static_route, ServeDir::new(static_root.into()))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
