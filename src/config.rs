//! Configuration management for the map slicer.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `MAPSLICER_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use mapslicer::config::{Cli, Command};
//!
//! // Parse from command line and environment
//! let cli = Cli::parse();
//!
//! match cli.command {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Slice(config) => println!("Slicing {}", config.image.display()),
//!     Command::Check(_) => println!("Checking configuration"),
//! }
//! ```
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the
//! `MAPSLICER_` prefix:
//!
//! - `MAPSLICER_HOST` - Server bind address (default: 0.0.0.0)
//! - `MAPSLICER_PORT` - Server port (default: 3000)
//! - `MAPSLICER_WORK_DIR` - Session temp directory root (default: work)
//! - `MAPSLICER_OUTPUT_DIR` - Archive output directory (default: output)
//! - `MAPSLICER_STATIC_DIR` - Local slice directory (default: static/slices)
//! - `MAPSLICER_PUBLIC_PREFIX` - URL prefix for local slices (default: /static/slices)
//! - `MAPSLICER_UPLOAD_ENDPOINT` - Remote upload endpoint URL (optional)
//! - `MAPSLICER_UPLOAD_API_KEY` - Bearer token for the remote endpoint (optional)
//! - `MAPSLICER_PUBLISH_WORKERS` - Concurrent publish workers (default: 4)
//! - `MAPSLICER_MAX_UPLOAD_BYTES` - Image upload size cap (default: 10485760)
//! - `MAPSLICER_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::publish::DEFAULT_PUBLISH_WORKERS;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default session temp directory root.
pub const DEFAULT_WORK_DIR: &str = "work";

/// Default archive output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default directory for locally published slices.
pub const DEFAULT_STATIC_DIR: &str = "static/slices";

/// Default URL prefix for locally published slices.
pub const DEFAULT_PUBLIC_PREFIX: &str = "/static/slices";

/// Default image upload size cap in bytes (10 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Map Slicer - slices images along image-map regions into email markup.
///
/// Takes a raster image plus HTML image-map markup, crops one slice per
/// rect region, publishes the slices, and reassembles them into responsive
/// email HTML plus a downloadable archive.
#[derive(Parser, Debug, Clone)]
#[command(name = "mapslicer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(ServeConfig),

    /// Run the pipeline once against local files.
    Slice(SliceConfig),

    /// Check the configuration and remote endpoint connectivity.
    Check(CheckConfig),
}

/// Storage and publishing options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct StorageConfig {
    /// Directory for per-session temporary files.
    #[arg(long, default_value = DEFAULT_WORK_DIR, env = "MAPSLICER_WORK_DIR")]
    pub work_dir: PathBuf,

    /// Directory final archives are written to.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, env = "MAPSLICER_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Directory locally published slices are written to.
    #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "MAPSLICER_STATIC_DIR")]
    pub static_dir: PathBuf,

    /// URL prefix local slice URLs are built from.
    #[arg(long, default_value = DEFAULT_PUBLIC_PREFIX, env = "MAPSLICER_PUBLIC_PREFIX")]
    pub public_prefix: String,

    /// Remote upload endpoint URL.
    ///
    /// If not specified, slices are published to local storage only.
    #[arg(long, env = "MAPSLICER_UPLOAD_ENDPOINT")]
    pub upload_endpoint: Option<String>,

    /// Bearer token for the remote upload endpoint.
    #[arg(long, env = "MAPSLICER_UPLOAD_API_KEY")]
    pub upload_api_key: Option<String>,

    /// Number of concurrent publish workers.
    #[arg(long, default_value_t = DEFAULT_PUBLISH_WORKERS, env = "MAPSLICER_PUBLISH_WORKERS")]
    pub publish_workers: usize,

    /// Maximum accepted image upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "MAPSLICER_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,
}

/// Configuration for the `serve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MAPSLICER_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MAPSLICER_PORT")]
    pub port: u16,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "MAPSLICER_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,

    #[command(flatten)]
    pub storage: StorageConfig,
}

/// Configuration for the `slice` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SliceConfig {
    /// Path of the source image file.
    #[arg(long)]
    pub image: PathBuf,

    /// Path of the image-map markup file.
    #[arg(long)]
    pub map: PathBuf,

    /// Output directory for the archive (overrides --output-dir).
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub storage: StorageConfig,
}

/// Configuration for the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub storage: StorageConfig,
}

impl StorageConfig {
    /// Validate the storage configuration and return an error message if
    /// invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.publish_workers == 0 {
            return Err("publish_workers must be greater than 0".to_string());
        }

        if self.max_upload_bytes < 1024 {
            return Err("max_upload_bytes must be at least 1024".to_string());
        }

        if self.public_prefix.trim_end_matches('/').is_empty() {
            return Err(
                "public_prefix is required. Set --public-prefix or MAPSLICER_PUBLIC_PREFIX"
                    .to_string(),
            );
        }
        if !self.public_prefix.starts_with('/') {
            return Err("public_prefix must start with '/'".to_string());
        }

        if let Some(endpoint) = &self.upload_endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| format!("invalid upload_endpoint '{}': {}", endpoint, e))?;
        } else if self.upload_api_key.is_some() {
            return Err(
                "upload_api_key is set but upload_endpoint is not. \
                 Set --upload-endpoint or MAPSLICER_UPLOAD_ENDPOINT, or drop the key"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Whether a remote upload endpoint is configured.
    pub fn remote_configured(&self) -> bool {
        self.upload_endpoint.is_some()
    }
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }
        self.storage.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SliceConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()
    }

    /// The archive output directory, honoring `--out` when given.
    pub fn output_dir(&self) -> &PathBuf {
        self.out.as_ref().unwrap_or(&self.storage.output_dir)
    }
}

impl CheckConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
