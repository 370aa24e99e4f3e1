use thiserror::Error;

use crate::workflow::Stage;

/// Input validation errors, surfaced before any processing is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No image file was provided with the request
    #[error("no image file provided")]
    MissingImage,

    /// The image file was present but empty
    #[error("image file is empty")]
    EmptyImage,

    /// The map markup was missing or blank
    #[error("map markup is empty")]
    EmptyMap,

    /// The image is not one of the allowed raster formats
    #[error("unsupported image type '{name}' (allowed: png, jpg, jpeg, gif)")]
    UnsupportedType { name: String },

    /// The image exceeds the configured upload size cap
    #[error("image too large: {size} bytes (limit: {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    /// The image bytes could not be decoded
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The request body could not be read (e.g. malformed multipart)
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// Hard failure from the coordinate parser: zero usable regions remain.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Every area tag was skipped or the markup contained none
    #[error("no valid region tags found in map markup ({skipped} tag(s) skipped)")]
    NoValidRegions { skipped: usize },
}

/// Hard failure from the slicer: zero usable slices remain.
#[derive(Debug, Error)]
pub enum SliceError {
    /// Every region fell outside the image bounds
    #[error("no region lies within the image bounds ({skipped} region(s) skipped)")]
    NoValidSlices { skipped: usize },
}

/// Errors from an individual asset store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Local filesystem write failed
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// Remote upload request failed
    #[error("upload failed: {0}")]
    Upload(String),

    /// Remote host accepted the upload but returned no URL
    #[error("remote host returned no asset URL")]
    MissingUrl,
}

/// Hard failure from the publisher: zero slices could be persisted.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Every slice failed to publish, even to local storage
    #[error("no slice could be published ({failed} slice(s) failed)")]
    NoPublishedAssets { failed: usize },
}

/// Errors while packaging the output archive.
#[derive(Debug, Error)]
pub enum PackageError {
    /// Filesystem error while assembling or writing the archive
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP encoding error
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Top-level pipeline error carrying the failure cause per stage.
///
/// Each variant corresponds to the transition that failed; the last
/// successfully reached stage is recoverable via [`stage_reached`].
///
/// [`stage_reached`]: PipelineError::stage_reached
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input validation failed before any processing
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Session workspace could not be prepared
    #[error("failed to prepare session workspace: {0}")]
    Session(#[source] std::io::Error),

    /// Map parsing produced zero valid regions
    #[error("map parsing failed: {0}")]
    Parse(#[from] ParseError),

    /// Slicing produced zero valid slices
    #[error("slicing failed: {0}")]
    Slice(#[from] SliceError),

    /// Publishing persisted zero slices
    #[error("publishing failed: {0}")]
    Publish(#[from] PublishError),

    /// Archive packaging failed
    #[error("packaging failed: {0}")]
    Package(#[from] PackageError),
}

impl PipelineError {
    /// The last stage the pipeline completed successfully before this error.
    pub fn stage_reached(&self) -> Stage {
        match self {
            PipelineError::Validation(_) => Stage::Received,
            PipelineError::Session(_) => Stage::Received,
            PipelineError::Parse(_) => Stage::Validated,
            PipelineError::Slice(_) => Stage::Parsed,
            PipelineError::Publish(_) => Stage::Sliced,
            PipelineError::Package(_) => Stage::Rendered,
        }
    }
}
