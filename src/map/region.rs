//! Rectangular region extracted from image-map markup.

/// A rectangular sub-area of the source image with an optional link target.
///
/// Coordinates are the raw parsed values in `left,top,right,bottom` order;
/// they may extend past the image bounds (the slicer clamps them). The
/// parser guarantees `left < right` and `top < bottom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Dense 0-based ordering index over the emitted regions, matching
    /// source order of the markup. Drives deterministic slice numbering.
    pub index: usize,

    /// Left edge in pixels (inclusive)
    pub left: i64,

    /// Top edge in pixels (inclusive)
    pub top: i64,

    /// Right edge in pixels (exclusive)
    pub right: i64,

    /// Bottom edge in pixels (exclusive)
    pub bottom: i64,

    /// Link target for the region, if any
    pub href: Option<String>,

    /// Descriptive label, used as alt text in the rendered markup
    pub alt: Option<String>,

    /// Optional title attribute carried through to the rendered markup
    pub title: Option<String>,
}

impl Region {
    /// Width of the region in pixels.
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    /// Height of the region in pixels.
    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }
}
