//! Image slicing: cropping the source image per parsed region.
//!
//! Slicing is a pure function of `(SourceImage, Region)`. Regions partially
//! outside the image are clamped to its bounds; regions fully outside are
//! skipped with a warning. Only zero remaining slices is a hard failure.

mod slice;
mod source;

pub use slice::{slice_regions, Slice, SliceOutcome, SliceWarning};
pub use source::{is_allowed_extension, SourceImage, ALLOWED_EXTENSIONS};
