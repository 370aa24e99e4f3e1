//! Map Slicer - slices images along image-map regions into email markup.
//!
//! This binary starts the HTTP server or runs the pipeline once.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapslicer::{
    config::{CheckConfig, Cli, Command, ServeConfig, SliceConfig, StorageConfig},
    publish::{AssetPublisher, LocalAssetStore, RemoteAssetStore},
    server::{create_router, RouterConfig},
    workflow::SlicePipeline,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config, cli.verbose).await,
        Command::Slice(config) => run_slice(config, cli.verbose).await,
        Command::Check(config) => run_check(config, cli.verbose).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig, verbose: bool) -> ExitCode {
    // Initialize logging
    init_logging(verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Work dir: {}", config.storage.work_dir.display());
    info!("  Output dir: {}", config.storage.output_dir.display());
    info!("  Static dir: {}", config.storage.static_dir.display());
    info!(
        "  Upload cap: {} MB",
        config.storage.max_upload_bytes / (1024 * 1024)
    );
    info!("  Publish workers: {}", config.storage.publish_workers);

    // Remote status with warning when absent
    if let Some(ref endpoint) = config.storage.upload_endpoint {
        info!("  Remote host: {}", endpoint);
    } else {
        warn!("  Remote host: not configured - slices are published locally only");
        warn!("        Set --upload-endpoint or MAPSLICER_UPLOAD_ENDPOINT to mirror slices");
    }

    // Build publisher and pipeline
    let publisher = match build_publisher(&config.storage) {
        Ok(publisher) => publisher,
        Err(e) => {
            error!("Failed to build publisher: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let pipeline = SlicePipeline::new(
        publisher,
        config.storage.work_dir.clone(),
        config.storage.output_dir.clone(),
        config.storage.max_upload_bytes,
    );

    // Build router configuration
    let mut router_config = RouterConfig::new(config.storage.max_upload_bytes)
        .with_tracing(!config.no_tracing);
    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    let router = create_router(
        pipeline,
        config.storage.public_prefix.trim_end_matches('/'),
        config.storage.static_dir.clone(),
        router_config,
    );

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -F image=@banner.png -F map_html='<area coords=\"0,0,100,100\">' \\"
    );
    info!("         http://{}/process", addr);
    info!("");
    info!("  Upload form in your browser:");
    info!("    open http://{}/", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Slice Command
// =============================================================================

async fn run_slice(config: SliceConfig, verbose: bool) -> ExitCode {
    init_logging(verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let image_name = match config.image.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => {
            error!("Invalid image path: {}", config.image.display());
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match tokio::fs::read(&config.image).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read image {}: {}", config.image.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let map_html = match tokio::fs::read_to_string(&config.map).await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read map {}: {}", config.map.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let publisher = match build_publisher(&config.storage) {
        Ok(publisher) => publisher,
        Err(e) => {
            error!("Failed to build publisher: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let pipeline = SlicePipeline::new(
        publisher,
        config.storage.work_dir.clone(),
        config.output_dir().clone(),
        config.storage.max_upload_bytes,
    );

    let output = match pipeline.run(&image_name, image_bytes.into(), &map_html).await {
        Ok(output) => output,
        Err(e) => {
            error!(
                "Pipeline failed after stage '{}': {}",
                e.stage_reached(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    println!("Session: {}", output.session_id);
    println!("Slices: {}", output.assets.len());
    for asset in &output.assets {
        println!("  [{}] {} ({})", asset.region.index, asset.url, asset.backend);
    }
    if !output.report.is_empty() {
        println!();
        println!("Warnings:");
        for message in &output.report.messages {
            println!("  - {}", message);
        }
    }
    println!();
    println!("Archive: {}", output.archive_path.display());

    ExitCode::SUCCESS
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig, verbose: bool) -> ExitCode {
    // Initialize minimal logging for check command
    if verbose {
        init_logging(true);
    }

    println!("Map Slicer Configuration Check");
    println!("═════════════════════════════════");
    println!();

    match config.validate() {
        Ok(()) => println!("✓ Configuration valid"),
        Err(e) => {
            println!("✗ Configuration: {}", e);
            return ExitCode::FAILURE;
        }
    }

    // Probe each directory for writability
    for (label, dir) in [
        ("Work dir", &config.storage.work_dir),
        ("Output dir", &config.storage.output_dir),
        ("Static dir", &config.storage.static_dir),
    ] {
        match probe_writable(dir).await {
            Ok(()) => println!("✓ {}: {}", label, dir.display()),
            Err(e) => {
                println!("✗ {}: {} ({})", label, dir.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    // Test remote endpoint connectivity
    println!();
    match &config.storage.upload_endpoint {
        Some(endpoint) => {
            print!("Testing remote host {}... ", endpoint);
            let client = reqwest::Client::new();
            match client.head(endpoint).send().await {
                Ok(response) => {
                    println!("✓ reachable (status {})", response.status());
                }
                Err(e) => {
                    println!("✗ unreachable");
                    println!();
                    println!("Error: {}", e);
                    println!();
                    println!("Please check:");
                    println!("  - The endpoint URL is correct");
                    println!("  - The host is up and reachable from this machine");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => {
            println!("Remote host: not configured (local-only publishing)");
        }
    }

    println!();
    println!("═════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}

/// Create the directory if needed and verify a file can be written in it.
async fn probe_writable(dir: &std::path::Path) -> Result<(), String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("cannot create: {}", e))?;

    let probe = dir.join(".mapslicer_check");
    tokio::fs::write(&probe, b"check")
        .await
        .map_err(|e| format!("not writable: {}", e))?;
    tokio::fs::remove_file(&probe)
        .await
        .map_err(|e| format!("cannot remove probe file: {}", e))?;

    Ok(())
}

// =============================================================================
// Shared Setup
// =============================================================================

/// Build the asset publisher from the storage configuration.
fn build_publisher(storage: &StorageConfig) -> Result<AssetPublisher, String> {
    let local = LocalAssetStore::new(&storage.static_dir, &storage.public_prefix);

    let remote = match &storage.upload_endpoint {
        Some(endpoint) => {
            let url = endpoint
                .parse()
                .map_err(|e| format!("invalid upload endpoint '{}': {}", endpoint, e))?;
            Some(RemoteAssetStore::new(url, storage.upload_api_key.clone()))
        }
        None => None,
    };

    Ok(AssetPublisher::new(local, remote).with_workers(storage.publish_workers))
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "mapslicer=debug,tower_http=debug"
    } else {
        "mapslicer=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
