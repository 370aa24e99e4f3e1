//! # Map Slicer
//!
//! A slicing service for HTML image maps.
//!
//! This library takes a raster image plus image-map markup (a set of
//! `<area shape="rect">` tags with pixel coordinates and link targets) and
//! produces one cropped PNG slice per valid region, a mobile-responsive
//! HTML document reassembling the slices into a clickable composite
//! suitable for embedding in email, and a downloadable ZIP archive
//! bundling the slices and the markup.
//!
//! ## Features
//!
//! - **Fragment-tolerant map parsing**: Accepts bare `<area>` tags in any
//!   markup snippet, skipping malformed tags with per-tag warnings
//! - **Bounds-safe slicing**: Crops are clamped to the source image; fully
//!   out-of-bounds regions are skipped, never fatal
//! - **Local-primary publishing**: Every slice lands on local storage;
//!   a remote hosting endpoint is mirrored to best-effort when configured
//! - **Responsive rendering**: Percent-based widths plus aspect-ratio
//!   placeholders keep the composite intact in constrained email clients
//! - **Session-scoped workspaces**: Each run owns a uuid-named temp
//!   directory that is removed on every exit path
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`map`] - Image-map parsing into ordered rect regions
//! - [`slicer`] - Source image decoding and region cropping
//! - [`publish`] - Local and remote asset stores behind one trait
//! - [`render`] - Responsive email markup generation
//! - [`workflow`] - Session lifecycle, stage machine, pipeline, packaging
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use mapslicer::publish::{AssetPublisher, LocalAssetStore};
//! use mapslicer::workflow::SlicePipeline;
//!
//! #[tokio::main]
//! async fn main() {
//!     let publisher = AssetPublisher::new(
//!         LocalAssetStore::new("static/slices", "/static/slices"),
//!         None,
//!     );
//!     let pipeline = SlicePipeline::new(publisher, "work", "output", 10 * 1024 * 1024);
//!
//!     let image = std::fs::read("banner.png").unwrap();
//!     let map = r#"<area shape="rect" coords="0,0,300,150" href="https://example.com">"#;
//!
//!     let output = pipeline
//!         .run("banner.png", image.into(), map)
//!         .await
//!         .unwrap();
//!     println!("{} slices -> {}", output.assets.len(), output.archive_path.display());
//! }
//! ```

pub mod config;
pub mod error;
pub mod map;
pub mod publish;
pub mod render;
pub mod server;
pub mod slicer;
pub mod workflow;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig, SliceConfig, StorageConfig};
pub use error::{
    PackageError, ParseError, PipelineError, PublishError, SliceError, StoreError, ValidationError,
};
pub use map::{parse_map, ParseOutcome, ParseWarning, Region, SkipReason};
pub use publish::{
    AssetPublisher, AssetStore, LocalAssetStore, PublishOutcome, PublishWarning, PublishedAsset,
    RemoteAssetStore, StorageBackend, DEFAULT_PUBLISH_WORKERS,
};
pub use render::render_email_html;
pub use server::{create_router, AppState, RouterConfig};
pub use slicer::{
    is_allowed_extension, slice_regions, Slice, SliceOutcome, SliceWarning, SourceImage,
    ALLOWED_EXTENSIONS,
};
pub use workflow::{
    build_archive, PipelineOutput, SlicePipeline, Stage, WarningReport, WorkflowSession,
};
