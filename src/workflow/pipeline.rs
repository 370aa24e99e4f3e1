//! End-to-end slicing pipeline.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PackageError, PipelineError, ValidationError};
use crate::map::parse_map;
use crate::publish::{AssetPublisher, PublishedAsset};
use crate::render::render_email_html;
use crate::slicer::{is_allowed_extension, slice_regions, SourceImage};

use super::{build_archive, Stage, WorkflowSession};

/// Warnings accumulated across the pipeline, returned alongside success.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarningReport {
    /// Area tags skipped by the parser
    pub skipped_tags: usize,

    /// Regions clamped to the image bounds
    pub clamped_regions: usize,

    /// Regions or slices dropped after parsing (out of bounds, publish
    /// failures)
    pub skipped_regions: usize,

    /// Slices that fell back to their local URL after a remote failure
    pub publish_fallbacks: usize,

    /// Human-readable warning messages, in pipeline order
    pub messages: Vec<String>,
}

impl WarningReport {
    /// Whether the run completed without a single warning.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Everything a completed run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The session that produced these outputs
    pub session_id: String,

    /// Generated responsive markup
    pub html: String,

    /// Published slices in region order
    pub assets: Vec<PublishedAsset>,

    /// Archive file name within the output directory
    pub archive_file: String,

    /// Full path of the written archive
    pub archive_path: PathBuf,

    /// Accumulated warnings
    pub report: WarningReport,
}

/// Orchestrates one request-scoped run of the slicing pipeline.
///
/// Drives the stage machine over the parser, slicer, publisher, renderer
/// and packager. Warnings accumulate into the report; hard failures abort
/// at the current stage and the session workspace is removed on every exit
/// path.
pub struct SlicePipeline {
    publisher: AssetPublisher,
    work_dir: PathBuf,
    output_dir: PathBuf,
    max_upload_bytes: usize,
}

impl SlicePipeline {
    /// Create a pipeline writing session temp files under `work_dir` and
    /// final archives under `output_dir`.
    pub fn new(
        publisher: AssetPublisher,
        work_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            publisher,
            work_dir: work_dir.into(),
            output_dir: output_dir.into(),
            max_upload_bytes,
        }
    }

    /// Directory final archives are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Configured upload size cap in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Run the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] identifying the failed transition and
    /// the last stage reached. Any session temp files created before the
    /// failure are removed.
    pub async fn run(
        &self,
        image_name: &str,
        image_bytes: Bytes,
        map_html: &str,
    ) -> Result<PipelineOutput, PipelineError> {
        // Received -> Validated
        let map_html = map_html.trim();
        if map_html.is_empty() {
            return Err(ValidationError::EmptyMap.into());
        }
        if image_bytes.is_empty() {
            return Err(ValidationError::EmptyImage.into());
        }
        if image_bytes.len() > self.max_upload_bytes {
            return Err(ValidationError::TooLarge {
                size: image_bytes.len(),
                limit: self.max_upload_bytes,
            }
            .into());
        }
        if !is_allowed_extension(image_name) {
            return Err(ValidationError::UnsupportedType {
                name: extension_of(image_name),
            }
            .into());
        }

        let source = SourceImage::decode(&image_bytes)?;

        let mut session =
            WorkflowSession::create(&self.work_dir).map_err(PipelineError::Session)?;
        debug!(session_id = %session.id(), stage = %Stage::Validated, width = source.width(), height = source.height(), "input validated");

        // Stage the upload inside the session workspace; the session owns
        // it and removes it with the rest of the temp files.
        let staged = session.dir().join(sanitize_filename(image_name));
        tokio::fs::write(&staged, &image_bytes)
            .await
            .map_err(PipelineError::Session)?;

        // Validated -> Parsed
        let parsed = parse_map(map_html)?;
        debug!(session_id = %session.id(), stage = %Stage::Parsed, regions = parsed.regions.len(), "map parsed");

        // Parsed -> Sliced
        let sliced = slice_regions(&source, &parsed.regions)?;
        debug!(session_id = %session.id(), stage = %Stage::Sliced, slices = sliced.slices.len(), "image sliced");

        // Sliced -> Published
        let published = self
            .publisher
            .publish_all(session.id(), &sliced.slices)
            .await?;
        debug!(session_id = %session.id(), stage = %Stage::Published, assets = published.assets.len(), "slices published");

        // Published -> Rendered
        let html = render_email_html(&published.assets, source.width(), source.height());
        debug!(session_id = %session.id(), stage = %Stage::Rendered, bytes = html.len(), "markup rendered");

        // Rendered -> Packaged
        let archive_file = format!("email_template_{}.zip", session.id());
        let archive_path = self.output_dir.join(&archive_file);
        let mut entries = Vec::with_capacity(published.assets.len());
        for asset in &published.assets {
            let data = tokio::fs::read(&asset.local_path)
                .await
                .map_err(|e| PipelineError::Package(PackageError::Io(e)))?;
            entries.push((format!("slice_{}.png", asset.region.index), data));
        }
        let archive = build_archive(&html, &entries)?;
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PipelineError::Package(PackageError::Io(e)))?;
        tokio::fs::write(&archive_path, &archive)
            .await
            .map_err(|e| PipelineError::Package(PackageError::Io(e)))?;

        // Packaged -> Completed: every output exists before the
        // intermediate temp files go away.
        session.cleanup();

        let report = build_report(&parsed.warnings, &sliced.warnings, &published.warnings);
        info!(
            session_id = %session.id(),
            stage = %Stage::Completed,
            slices = published.assets.len(),
            warnings = report.messages.len(),
            archive = %archive_path.display(),
            "pipeline completed"
        );

        Ok(PipelineOutput {
            session_id: session.id().to_string(),
            html,
            assets: published.assets,
            archive_file,
            archive_path,
            report,
        })
    }
}

/// Fold the per-stage warnings into one report.
fn build_report(
    parse: &[crate::map::ParseWarning],
    slice: &[crate::slicer::SliceWarning],
    publish: &[crate::publish::PublishWarning],
) -> WarningReport {
    use crate::publish::PublishWarning;
    use crate::slicer::SliceWarning;

    let mut report = WarningReport::default();

    for warning in parse {
        report.skipped_tags += 1;
        report.messages.push(warning.to_string());
    }
    for warning in slice {
        match warning {
            SliceWarning::Clamped { .. } => report.clamped_regions += 1,
            SliceWarning::OutOfBounds { .. } => report.skipped_regions += 1,
        }
        report.messages.push(warning.to_string());
    }
    for warning in publish {
        match warning {
            PublishWarning::RemoteFailed { .. } => report.publish_fallbacks += 1,
            PublishWarning::SliceDropped { .. } => report.skipped_regions += 1,
            PublishWarning::RemoteUnconfigured => {}
        }
        report.messages.push(warning.to_string());
    }

    report
}

/// Reduce an uploaded file name to a safe, path-free name.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim_start_matches('.');

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "uploaded_image".to_string()
    } else {
        cleaned
    }
}

/// Extension of a file name, or the whole name when it has none.
fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| name.to_string())
}
