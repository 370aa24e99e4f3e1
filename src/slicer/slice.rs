//! Region cropping with the clamp-or-skip edge policy.

use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use crate::error::SliceError;
use crate::map::Region;

use super::SourceImage;

/// A cropped raster derived from one region of the source image.
///
/// Owns its own pixel buffer, independent of the source once cropped, and
/// carries its region so the link target and ordering index survive into
/// publishing and rendering.
#[derive(Debug, Clone)]
pub struct Slice {
    /// The region this slice was cut from
    pub region: Region,

    /// Clamped crop origin within the source image
    pub x: u32,

    /// Clamped crop origin within the source image
    pub y: u32,

    image: DynamicImage,
}

impl Slice {
    /// Slice width in pixels (after clamping).
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Slice height in pixels (after clamping).
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// File name for this slice, derived from its ordering index.
    pub fn file_name(&self) -> String {
        format!("slice_{}.png", self.region.index)
    }

    /// Encode the slice as PNG.
    ///
    /// Slices are always stored as PNG regardless of the source format, so
    /// crops stay lossless.
    pub fn encode_png(&self) -> Result<Bytes, image::ImageError> {
        let mut out = Cursor::new(Vec::new());
        self.image.write_to(&mut out, ImageFormat::Png)?;
        Ok(Bytes::from(out.into_inner()))
    }
}

/// Result of slicing: the slices plus per-region warnings.
#[derive(Debug)]
pub struct SliceOutcome {
    /// Slices in region order
    pub slices: Vec<Slice>,

    /// Warnings for clamped or skipped regions
    pub warnings: Vec<SliceWarning>,
}

/// A region that needed edge handling during slicing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceWarning {
    /// Region extended past the image bounds and was clamped; the slice
    /// was still produced
    Clamped {
        region_index: usize,
        width: u32,
        height: u32,
    },

    /// Region lies fully outside the image bounds; no slice was produced
    OutOfBounds { region_index: usize },
}

impl fmt::Display for SliceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceWarning::Clamped {
                region_index,
                width,
                height,
            } => write!(
                f,
                "region {} clamped to image bounds ({}x{})",
                region_index, width, height
            ),
            SliceWarning::OutOfBounds { region_index } => {
                write!(f, "region {} skipped: fully outside image bounds", region_index)
            }
        }
    }
}

/// Crop the source image once per region.
///
/// Pure over its inputs: no shared mutable state between slices, so the
/// order of cropping cannot affect results. Each crop covers the pixel
/// rectangle `[left, top) x [right, bottom)` clamped to the image bounds.
///
/// # Errors
///
/// Returns [`SliceError::NoValidSlices`] when no region intersects the
/// image at all.
pub fn slice_regions(source: &SourceImage, regions: &[Region]) -> Result<SliceOutcome, SliceError> {
    let width = i64::from(source.width());
    let height = i64::from(source.height());

    let mut slices = Vec::with_capacity(regions.len());
    let mut warnings = Vec::new();

    for region in regions {
        let left = region.left.clamp(0, width);
        let top = region.top.clamp(0, height);
        let right = region.right.clamp(0, width);
        let bottom = region.bottom.clamp(0, height);

        if left >= right || top >= bottom {
            let warning = SliceWarning::OutOfBounds {
                region_index: region.index,
            };
            warn!("{}", warning);
            warnings.push(warning);
            continue;
        }

        let crop_w = (right - left) as u32;
        let crop_h = (bottom - top) as u32;
        let clamped = crop_w != region.width() as u32 || crop_h != region.height() as u32;

        let image = source
            .as_dynamic()
            .crop_imm(left as u32, top as u32, crop_w, crop_h);

        if clamped {
            let warning = SliceWarning::Clamped {
                region_index: region.index,
                width: crop_w,
                height: crop_h,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        slices.push(Slice {
            region: region.clone(),
            x: left as u32,
            y: top as u32,
            image,
        });
    }

    if slices.is_empty() {
        return Err(SliceError::NoValidSlices {
            skipped: warnings.len(),
        });
    }

    debug!(
        slices = slices.len(),
        warnings = warnings.len(),
        "sliced source image"
    );

    Ok(SliceOutcome { slices, warnings })
}
