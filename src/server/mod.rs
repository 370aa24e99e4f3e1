//! HTTP server layer for the map slicer.
//!
//! This module provides the HTTP API around the slicing pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   POST /process   GET /download/{filename}   GET /static/...    │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    pages    │  │        routes           │  │
//! │  │ (requests)  │  │ (upload UI) │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod pages;
pub mod routes;

pub use handlers::{
    download_handler, health_handler, index_handler, process_handler, AppState, AssetResponse,
    ErrorResponse, HealthResponse, ProcessResponse,
};
pub use routes::{create_router, RouterConfig};
