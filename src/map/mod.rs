//! Coordinate parser for HTML image-map markup.
//!
//! Extracts rectangular [`Region`] definitions from `<area>` tags in
//! document order. Individually malformed tags are skipped with a typed
//! warning rather than aborting the parse; only a markup with zero usable
//! regions is a hard failure.

mod parser;
mod region;

pub use parser::{parse_map, ParseOutcome, ParseWarning, SkipReason};
pub use region::Region;
