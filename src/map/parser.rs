//! `<area>` tag extraction from raw map markup.
//!
//! The markup is parsed leniently: bare area tags without a `<map>` wrapper
//! are accepted, attribute order is free, and unknown tags are ignored.

use std::fmt;

use tracing::{debug, warn};

use crate::error::ParseError;

use super::Region;

/// Number of comma-separated coordinates a rectangular area must declare.
const RECT_COORD_COUNT: usize = 4;

/// Result of parsing map markup: the valid regions plus per-tag warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Valid regions in source order, densely indexed from 0
    pub regions: Vec<Region>,

    /// One warning per skipped area tag
    pub warnings: Vec<ParseWarning>,
}

/// A single area tag that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 0-based position of the tag among all area tags in the markup
    pub tag_index: usize,

    /// Why the tag was skipped
    pub reason: SkipReason,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area tag {} skipped: {}", self.tag_index, self.reason)
    }
}

/// Why an individual area tag could not be turned into a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Shape is not an axis-aligned rectangle (e.g. circle, poly)
    UnsupportedShape(String),

    /// The coords attribute is missing or empty
    MissingCoords,

    /// The coords attribute has the wrong number of values
    WrongCoordCount(usize),

    /// A coordinate value is not an integer
    NonNumericCoord(String),

    /// The rectangle has zero or negative width/height
    DegenerateRect,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedShape(shape) => {
                write!(f, "unsupported shape '{}' (only 'rect' is supported)", shape)
            }
            SkipReason::MissingCoords => write!(f, "missing coords attribute"),
            SkipReason::WrongCoordCount(found) => write!(
                f,
                "expected {} coordinates, found {}",
                RECT_COORD_COUNT, found
            ),
            SkipReason::NonNumericCoord(value) => {
                write!(f, "non-numeric coordinate '{}'", value)
            }
            SkipReason::DegenerateRect => {
                write!(f, "degenerate rectangle (left >= right or top >= bottom)")
            }
        }
    }
}

/// Parse map markup into an ordered sequence of regions.
///
/// Area tags are visited in document order. Tags that cannot be turned
/// into a valid rectangular region are skipped and reported via
/// [`ParseOutcome::warnings`]; parsing only fails hard when zero valid
/// regions remain.
///
/// # Errors
///
/// Returns [`ParseError::NoValidRegions`] when the markup contains no
/// usable rectangular area tags.
pub fn parse_map(markup: &str) -> Result<ParseOutcome, ParseError> {
    let mut regions = Vec::new();
    let mut warnings = Vec::new();

    let dom = match tl::parse(markup, tl::ParserOptions::default()) {
        Ok(dom) => dom,
        Err(e) => {
            warn!("map markup could not be parsed: {}", e);
            return Err(ParseError::NoValidRegions { skipped: 0 });
        }
    };
    let parser = dom.parser();

    let mut tag_index = 0;
    if let Some(selector) = dom.query_selector("area") {
        for handle in selector {
            let Some(tag) = handle.get(parser).and_then(|node| node.as_tag()) else {
                continue;
            };

            match parse_area_tag(tag, regions.len()) {
                Ok(region) => regions.push(region),
                Err(reason) => {
                    let warning = ParseWarning { tag_index, reason };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
            tag_index += 1;
        }
    }

    if regions.is_empty() {
        return Err(ParseError::NoValidRegions {
            skipped: warnings.len(),
        });
    }

    debug!(
        regions = regions.len(),
        skipped = warnings.len(),
        "parsed map markup"
    );

    Ok(ParseOutcome { regions, warnings })
}

/// Turn one area tag into a region, or explain why it must be skipped.
fn parse_area_tag(tag: &tl::HTMLTag<'_>, index: usize) -> Result<Region, SkipReason> {
    let attrs = tag.attributes();

    // Shape defaults to rect when absent, per the HTML spec.
    let shape = attr_value(attrs, "shape").unwrap_or_else(|| "rect".to_string());
    if !shape.eq_ignore_ascii_case("rect") {
        return Err(SkipReason::UnsupportedShape(shape));
    }

    let coords_str = attr_value(attrs, "coords").ok_or(SkipReason::MissingCoords)?;
    if coords_str.trim().is_empty() {
        return Err(SkipReason::MissingCoords);
    }

    let parts: Vec<&str> = coords_str.split(',').map(str::trim).collect();
    if parts.len() != RECT_COORD_COUNT {
        return Err(SkipReason::WrongCoordCount(parts.len()));
    }

    let mut coords = [0i64; RECT_COORD_COUNT];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| SkipReason::NonNumericCoord(part.to_string()))?;
    }

    let [left, top, right, bottom] = coords;
    if left >= right || top >= bottom {
        return Err(SkipReason::DegenerateRect);
    }

    Ok(Region {
        index,
        left,
        top,
        right,
        bottom,
        href: attr_value(attrs, "href").filter(|href| !href.is_empty()),
        alt: attr_value(attrs, "alt").filter(|alt| !alt.is_empty()),
        title: attr_value(attrs, "title").filter(|title| !title.is_empty()),
    })
}

/// Read an attribute value as an owned string, if present.
fn attr_value(attrs: &tl::Attributes<'_>, name: &str) -> Option<String> {
    for (key, value) in attrs.iter() {
        let key_str: &str = key.as_ref();
        if key_str.eq_ignore_ascii_case(name) {
            return Some(value.map(|v| v.to_string()).unwrap_or_default());
        }
    }
    None
}
