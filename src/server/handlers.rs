//! HTTP request handlers for the slicing API.
//!
//! # Endpoints
//!
//! - `POST /process` - Run the slicing pipeline on an uploaded image + map
//! - `GET /download/{filename}` - Download a produced archive
//! - `GET /health` - Health check endpoint
//! - `GET /` - Upload form page

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{PipelineError, ValidationError};
use crate::workflow::{SlicePipeline, WarningReport};

use super::pages;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the slicing pipeline.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// The pipeline driving every processing request
    pub pipeline: Arc<SlicePipeline>,
}

impl AppState {
    /// Create a new application state around the given pipeline.
    pub fn new(pipeline: SlicePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "no_valid_regions", "invalid_request")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Last pipeline stage that completed before the failure
    pub stage: String,

    /// HTTP status code (included for convenience)
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        stage: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            stage: stage.into(),
            status: status.as_u16(),
        }
    }
}

/// One published slice in the process response.
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    /// Region index in source order
    pub index: usize,

    /// Fetchable URL of the slice
    pub url: String,

    /// Which store the URL points at ("local" or "remote")
    pub backend: String,

    /// Slice file name inside the archive
    pub file_name: String,
}

/// Successful response from `POST /process`.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    /// Session identifier for this run
    pub session_id: String,

    /// Number of published slices
    pub slice_count: usize,

    /// Generated responsive markup
    pub html: String,

    /// Published slices in region order
    pub assets: Vec<AssetResponse>,

    /// Warnings accumulated during the run
    pub warnings: WarningReport,

    /// Relative URL of the downloadable archive
    pub download_url: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert PipelineError to HTTP response.
///
/// 4xx errors are logged at WARN level (client errors), 5xx errors at
/// ERROR level (server errors). The response body carries the last stage
/// the pipeline completed.
impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            PipelineError::Validation(ValidationError::TooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
            }
            PipelineError::Validation(ValidationError::UnsupportedType { .. }) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type")
            }
            PipelineError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            PipelineError::Parse(_) => (StatusCode::UNPROCESSABLE_ENTITY, "no_valid_regions"),
            PipelineError::Slice(_) => (StatusCode::UNPROCESSABLE_ENTITY, "no_valid_slices"),
            PipelineError::Publish(_) => (StatusCode::BAD_GATEWAY, "publish_failed"),
            PipelineError::Package(_) => (StatusCode::INTERNAL_SERVER_ERROR, "package_failed"),
            PipelineError::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "session_failed"),
        };

        let stage = self.stage_reached();
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                stage = %stage,
                "Server error: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                stage = %stage,
                "Client error: {}",
                message
            );
        }

        let body = ErrorResponse::new(error_type, message, stage.as_str(), status);
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle processing requests.
///
/// # Endpoint
///
/// `POST /process`
///
/// # Request
///
/// Multipart form with two parts:
///
/// - `image`: the source image file (PNG, JPG, JPEG or GIF)
/// - `map_html`: the image-map markup text
///
/// # Response
///
/// - `200 OK`: JSON with generated markup, published URLs, warnings and a
///   download URL for the archive
/// - `400 Bad Request`: missing part or malformed multipart body
/// - `413 Payload Too Large`: image over the configured size cap
/// - `415 Unsupported Media Type`: disallowed image format
/// - `422 Unprocessable Entity`: no valid regions or slices remain
/// - `502 Bad Gateway`: no slice could be published
/// - `500 Internal Server Error`: packaging or session error
pub async fn process_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, PipelineError> {
    let mut image_name: Option<String> = None;
    let mut image_bytes = None;
    let mut map_html: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        PipelineError::Validation(ValidationError::MalformedRequest(e.to_string()))
    })? {
        match field.name() {
            Some("image") => {
                image_name = field.file_name().map(|n| n.to_string());
                let data = field.bytes().await.map_err(|e| {
                    PipelineError::Validation(ValidationError::MalformedRequest(e.to_string()))
                })?;
                image_bytes = Some(data);
            }
            Some("map_html") => {
                let text = field.text().await.map_err(|e| {
                    PipelineError::Validation(ValidationError::MalformedRequest(e.to_string()))
                })?;
                map_html = Some(text);
            }
            other => {
                debug!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    let image_bytes =
        image_bytes.ok_or(PipelineError::Validation(ValidationError::MissingImage))?;
    let image_name = image_name.ok_or(PipelineError::Validation(ValidationError::MissingImage))?;
    let map_html = map_html.ok_or(PipelineError::Validation(ValidationError::EmptyMap))?;

    info!(image = %image_name, bytes = image_bytes.len(), "processing request received");

    let output = state
        .pipeline
        .run(&image_name, image_bytes, &map_html)
        .await?;

    let assets = output
        .assets
        .iter()
        .map(|asset| AssetResponse {
            index: asset.region.index,
            url: asset.url.clone(),
            backend: asset.backend.as_str().to_string(),
            file_name: asset.file_name.clone(),
        })
        .collect();

    Ok(Json(ProcessResponse {
        download_url: format!("/download/{}", output.archive_file),
        session_id: output.session_id,
        slice_count: output.assets.len(),
        html: output.html,
        assets,
        warnings: output.report,
    }))
}

/// Handle archive download requests.
///
/// # Endpoint
///
/// `GET /download/{filename}`
///
/// # Response
///
/// - `200 OK`: ZIP archive with `Content-Disposition: attachment`
/// - `400 Bad Request`: filename contains path separators or `..`
/// - `404 Not Found`: no such archive
pub async fn download_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        warn!(filename = %filename, "rejected traversal attempt in download path");
        let body = ErrorResponse::new(
            "invalid_request",
            "invalid archive name",
            "completed",
            StatusCode::BAD_REQUEST,
        );
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let path = state.pipeline.output_dir().join(&filename);
    match tokio::fs::read(&path).await {
        Ok(data) => {
            debug!(filename = %filename, bytes = data.len(), "serving archive");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/zip".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                data,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(filename = %filename, "archive not found");
            let body = ErrorResponse::new(
                "not_found",
                format!("archive not found: {}", filename),
                "completed",
                StatusCode::NOT_FOUND,
            );
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
        Err(e) => {
            error!(filename = %filename, "failed to read archive: {}", e);
            let body = ErrorResponse::new(
                "io_error",
                format!("failed to read archive: {}", e),
                "completed",
                StatusCode::INTERNAL_SERVER_ERROR,
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Serve the upload form page.
///
/// # Endpoint
///
/// `GET /`
pub async fn index_handler() -> Html<String> {
    Html(pages::render_upload_page())
}

// =============================================================================
// Tests
// =============================================================================
